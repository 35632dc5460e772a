//! # websharex-entity
//!
//! Domain entity models for WebShareX. A [`room::Room`] is the database
//! row; its entries are a forest of [`entry::Entry`] values stored as one
//! JSON document and manipulated in memory through [`entry::EntryTree`].

pub mod entry;
pub mod room;
