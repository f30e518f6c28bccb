// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod contact_lookup_test;
pub mod crawl_pipeline_test;
pub mod helpers;
pub mod link_discovery_test;
pub mod listing_repository_test;
