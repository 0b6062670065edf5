// ABOUTME: Configuration module organization
// ABOUTME: Environment-only configuration; no config files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

/// Environment-backed server configuration
pub mod environment;
