// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod abac;
mod auth;
mod modules;
mod rbac;
mod routes;
mod support;
mod users;
