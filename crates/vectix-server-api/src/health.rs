// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthResponse {
	pub status: String,
}

impl HealthResponse {
	pub fn healthy() -> Self {
		Self {
			status: "healthy".to_string(),
		}
	}

	pub fn unhealthy() -> Self {
		Self {
			status: "unhealthy".to_string(),
		}
	}
}
