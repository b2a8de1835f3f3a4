//! Request extractors whose rejections render as [`AppError`](crate::AppError).

pub mod json_body;

pub use json_body::JsonBody;
