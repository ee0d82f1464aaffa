//! Nutriharvest storefront interaction layer.
//!
//! Reacts to shopper input and timers, talks to the backend's JSON
//! endpoints, and patches a headless model of the rendered page.
//!
//! # Architecture
//!
//! - [`api`] - Backend endpoints behind the [`api::StorefrontApi`] trait
//! - [`page`] - The page model controllers mutate through [`page::PageHandle`]
//! - [`state`] - Page-scoped state shared by every controller
//! - [`lifecycle`] and [`poller`] - Cancellable timers and periodic fetches
//! - Controllers: [`cart`], [`wishlist`], [`notifications`], [`banners`],
//!   [`review`], [`newsletter`], [`navigation`], [`bulk`], [`validation`]
//! - [`app`] - Wires the controllers of one page together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod banners;
pub mod bulk;
pub mod cart;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod navigation;
pub mod newsletter;
pub mod notifications;
pub mod page;
pub mod poller;
pub mod review;
pub mod session;
pub mod state;
pub mod toast;
pub mod validation;
pub mod wishlist;

#[cfg(test)]
mod test_support;

pub use app::Storefront;
pub use error::{Result, StorefrontError};
