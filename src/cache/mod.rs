// ABOUTME: Caching layer for rarely-changing catalog metadata shared across invocations
// ABOUTME: A single lazily-filled snapshot that expires by TTL only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Cache
//!
//! Concurrent pipeline invocations share nothing except the catalog metadata
//! snapshot held here. The first access fills it; later accesses reuse it
//! until the TTL lapses. There is no explicit invalidation path.

/// TTL snapshot cache
pub mod memory;

pub use memory::CatalogMetadataCache;
