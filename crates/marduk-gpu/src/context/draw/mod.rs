//! Draw entry points of [`DrawContext`](super::DrawContext), one module per
//! shape family.

mod clear;
mod lattice;
mod path;
mod rect;
mod rrect;
mod vertices;
