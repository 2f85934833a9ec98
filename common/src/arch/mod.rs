//! Architecture-specific code.
//!
//! Only compiled in for the matching target; host builds see an empty module
//! so the rest of the workspace can be unit tested off-target.

cfg_if::cfg_if! {
    if #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))] {
        pub mod riscv;
    }
}
