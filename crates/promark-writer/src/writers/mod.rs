/*
 * writers/mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Output backends for the non-markup presentations. Markup rendering
//! lives in [`crate::layout`].

pub mod data;
pub mod free;
