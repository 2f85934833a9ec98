//! Hardware Abstraction Layer (HAL) - Capability Traits
//!
//! Each peripheral class gets one trait. Concrete drivers in
//! [`crate::peripheral`] implement it once per hardware variant, and the
//! board module binds the variant at build time. Call sites hold
//! `&dyn Trait` handles and never branch on the variant.
//!
//! # Design Principles
//!
//! - **One table per class**: the trait is the capability table; it cannot
//!   grow or shrink after the board is built
//! - **No platform leakage**: traits must not reference board types
//! - **Explicit register blocks**: drivers reach hardware through
//!   [`mmio::RegisterIo`], which carries its own base address
//!
//! # Available Interfaces
//!
//! - [`uart`]: Serial transceivers
//! - [`clock`]: Clock sources and the rate-change notification hub
//! - [`dma`]: DMA channel pass-through
//! - [`mmio`]: Memory-mapped register access

pub mod clock;
pub mod dma;
pub mod mmio;
pub mod uart;
