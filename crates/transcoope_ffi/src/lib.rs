//! Flutter bridge for the TransCoope shell core.

pub mod api;
