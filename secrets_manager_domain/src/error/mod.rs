// /////////////////////////////////////////////////////////////////////////////
// Secrets Manager
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Error types for the secrets-manager domain.
//!
//! The whole domain reports failures through a single hierarchical error
//! enum, [`SecretsManagerError`]. See the module documentation in
//! [`secrets_error`] for the category taxonomy and propagation policy.

pub mod secrets_error;

pub use secrets_error::SecretsManagerError;
