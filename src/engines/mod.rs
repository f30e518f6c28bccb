// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod contact_lookup;
pub mod http_client;
pub mod http_fetcher;
pub mod limiter;
pub mod traits;
