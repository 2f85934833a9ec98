//! Machine-mode CSR access for hart identification and PMP programming.
//!
//! CSR numbers are encoded in the instruction, so every `pmpaddrN` and
//! `pmpcfgN` register gets its own `csrr`/`csrw` site.
//!
//! # Safety
//!
//! Writes change the protection state of the executing hart. They must run in
//! M-mode, on the hart that owns the configuration.

/// Number of PMP entries this module can address.
pub const MAX_PMP_REGIONS: usize = 16;

/// PMP configuration bytes packed into one `pmpcfgN` register.
const CFG_ENTRIES_PER_CSR: usize = core::mem::size_of::<usize>();

macro_rules! csr_read {
    ($csr:literal) => {{
        let value: usize;
        unsafe {
            core::arch::asm!(concat!("csrr {0}, ", $csr), out(reg) value, options(nomem, nostack));
        }
        value
    }};
}

macro_rules! csr_write {
    ($csr:literal, $value:expr) => {{
        let value: usize = $value;
        unsafe {
            core::arch::asm!(concat!("csrw ", $csr, ", {0}"), in(reg) value, options(nostack));
        }
    }};
}

/// Identifier of the executing hart.
#[inline(always)]
pub fn hart_id() -> usize {
    csr_read!("mhartid")
}

/// Read `pmpaddr<index>`. Returns `None` past [`MAX_PMP_REGIONS`].
pub fn read_pmpaddr(index: usize) -> Option<usize> {
    let value = match index {
        0 => csr_read!("pmpaddr0"),
        1 => csr_read!("pmpaddr1"),
        2 => csr_read!("pmpaddr2"),
        3 => csr_read!("pmpaddr3"),
        4 => csr_read!("pmpaddr4"),
        5 => csr_read!("pmpaddr5"),
        6 => csr_read!("pmpaddr6"),
        7 => csr_read!("pmpaddr7"),
        8 => csr_read!("pmpaddr8"),
        9 => csr_read!("pmpaddr9"),
        10 => csr_read!("pmpaddr10"),
        11 => csr_read!("pmpaddr11"),
        12 => csr_read!("pmpaddr12"),
        13 => csr_read!("pmpaddr13"),
        14 => csr_read!("pmpaddr14"),
        15 => csr_read!("pmpaddr15"),
        _ => return None,
    };
    Some(value)
}

/// Write `pmpaddr<index>`. Indices past [`MAX_PMP_REGIONS`] are ignored.
///
/// # Safety
///
/// See the module documentation.
pub unsafe fn write_pmpaddr(index: usize, value: usize) {
    match index {
        0 => csr_write!("pmpaddr0", value),
        1 => csr_write!("pmpaddr1", value),
        2 => csr_write!("pmpaddr2", value),
        3 => csr_write!("pmpaddr3", value),
        4 => csr_write!("pmpaddr4", value),
        5 => csr_write!("pmpaddr5", value),
        6 => csr_write!("pmpaddr6", value),
        7 => csr_write!("pmpaddr7", value),
        8 => csr_write!("pmpaddr8", value),
        9 => csr_write!("pmpaddr9", value),
        10 => csr_write!("pmpaddr10", value),
        11 => csr_write!("pmpaddr11", value),
        12 => csr_write!("pmpaddr12", value),
        13 => csr_write!("pmpaddr13", value),
        14 => csr_write!("pmpaddr14", value),
        15 => csr_write!("pmpaddr15", value),
        _ => {}
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "riscv64")] {
        // RV64 only implements the even-numbered pmpcfg registers.
        fn read_pmpcfg(csr: usize) -> usize {
            match csr {
                0 => csr_read!("pmpcfg0"),
                2 => csr_read!("pmpcfg2"),
                _ => 0,
            }
        }

        fn write_pmpcfg(csr: usize, value: usize) {
            match csr {
                0 => csr_write!("pmpcfg0", value),
                2 => csr_write!("pmpcfg2", value),
                _ => {}
            }
        }

        const fn cfg_csr(region: usize) -> usize {
            (region / CFG_ENTRIES_PER_CSR) * 2
        }
    } else {
        fn read_pmpcfg(csr: usize) -> usize {
            match csr {
                0 => csr_read!("pmpcfg0"),
                1 => csr_read!("pmpcfg1"),
                2 => csr_read!("pmpcfg2"),
                3 => csr_read!("pmpcfg3"),
                _ => 0,
            }
        }

        fn write_pmpcfg(csr: usize, value: usize) {
            match csr {
                0 => csr_write!("pmpcfg0", value),
                1 => csr_write!("pmpcfg1", value),
                2 => csr_write!("pmpcfg2", value),
                3 => csr_write!("pmpcfg3", value),
                _ => {}
            }
        }

        const fn cfg_csr(region: usize) -> usize {
            region / CFG_ENTRIES_PER_CSR
        }
    }
}

/// Read the configuration byte of one PMP region.
pub fn read_pmpcfg_entry(region: usize) -> u8 {
    if region >= MAX_PMP_REGIONS {
        return 0;
    }
    let shift = (region % CFG_ENTRIES_PER_CSR) * 8;
    (read_pmpcfg(cfg_csr(region)) >> shift) as u8
}

/// Replace the configuration byte of one PMP region, leaving its neighbours
/// in the same `pmpcfgN` register untouched.
///
/// # Safety
///
/// See the module documentation.
pub unsafe fn write_pmpcfg_entry(region: usize, value: u8) {
    if region >= MAX_PMP_REGIONS {
        return;
    }
    let csr = cfg_csr(region);
    let shift = (region % CFG_ENTRIES_PER_CSR) * 8;
    let mut packed = read_pmpcfg(csr);
    packed &= !(0xFF << shift);
    packed |= (value as usize) << shift;
    write_pmpcfg(csr, packed);
}
