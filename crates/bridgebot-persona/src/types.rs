// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the persona service API.

use serde::{Deserialize, Serialize};

/// Character metadata returned by `GET /v1/characters/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterResponse {
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for `POST /v1/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub character_id: &'a str,
    /// The rendered conversation batch, one formatted message per line.
    pub message: &'a str,
}

/// Response body for `POST /v1/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub reply: String,
}

/// Error envelope returned by the persona API on failure.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub type_: String,
    pub message: String,
}
