//! # Register Address Space
//!
//! Partitions the flat 16-bit register-number space into a read-write (RW)
//! region, a read-only (RO) region and, optionally, an auxiliary extended
//! read-only region.
//!
//! ## Layouts
//!
//! | Layout | Condition | Reads |
//! |--------|-----------|-------|
//! | `RwThenRo` | `ro.start == rw.end + 1` | may span both regions |
//! | `RoThenRw` | `rw.start == ro.end + 1` | may span both regions |
//! | `Disjoint` | anything else | must stay inside one region |
//!
//! The layout is chosen once when the map is built. Writes always resolve
//! against the RW region alone.
//!
//! ## Example
//!
//! ```rust
//! use modbus_rtu_slave::{Bank, Region, RegisterLayout, RegisterMap};
//!
//! let map = RegisterMap::new(Region::new(0, 1).unwrap(), Region::new(1, 1).unwrap()).unwrap();
//! assert_eq!(map.layout(), RegisterLayout::RwThenRo);
//!
//! let span = map.resolve_read(0, 2).unwrap();
//! let banks: Vec<_> = span.iter().collect();
//! assert_eq!(banks, vec![(Bank::ReadWrite, 0), (Bank::ReadOnly, 0)]);
//! ```

use std::fmt;

use crate::error::{ModbusError, ModbusResult};

/// Number of addressable registers
const REGISTER_SPACE: u32 = 1 << 16;

/// Contiguous run of register numbers `[start, start + total)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    start: u16,
    /// u32 so a combined span may cover the whole register space
    total: u32,
}

impl Region {
    /// Create a region; `total == 0` is an empty region.
    pub fn new(start: u16, total: u16) -> ModbusResult<Self> {
        if start as u32 + total as u32 > REGISTER_SPACE {
            return Err(ModbusError::configuration(format!(
                "Region {} + {} exceeds the register space",
                start, total
            )));
        }
        Ok(Self {
            start,
            total: total as u32,
        })
    }

    /// Region holding no registers
    pub const fn empty() -> Self {
        Self { start: 0, total: 0 }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Inclusive last register number, `None` for an empty region
    pub fn end(&self) -> Option<u16> {
        if self.is_empty() {
            None
        } else {
            Some((self.end_exclusive() - 1) as u16)
        }
    }

    #[inline]
    fn end_exclusive(&self) -> u32 {
        self.start as u32 + self.total
    }

    /// Whether register `reg` lies in the region
    #[inline]
    pub fn contains(&self, reg: u16) -> bool {
        reg >= self.start && (reg as u32) < self.end_exclusive()
    }

    /// Whether `[start, start + count)` is a non-empty range inside the region
    #[inline]
    pub fn contains_range(&self, start: u16, count: u16) -> bool {
        count != 0
            && count as u32 <= self.total
            && start >= self.start
            && start as u32 + count as u32 <= self.end_exclusive()
    }

    /// Region-relative offset of `reg`; caller has checked `contains`
    #[inline]
    fn offset_of(&self, reg: u16) -> usize {
        (reg - self.start) as usize
    }

    fn overlaps(&self, other: &Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && (self.start as u32) < other.end_exclusive()
            && (other.start as u32) < self.end_exclusive()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end() {
            Some(end) => write!(f, "[{}..={}]", self.start, end),
            None => write!(f, "[empty]"),
        }
    }
}

/// Backing store a register resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    ReadWrite,
    ReadOnly,
    Extended,
}

/// Physical arrangement of the RW and RO regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterLayout {
    /// RW immediately followed by RO
    RwThenRo,
    /// RO immediately followed by RW
    RoThenRw,
    /// Independent bounds, no mixed-region reads
    Disjoint,
}

/// Static register address space of one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    rw: Region,
    ro: Region,
    extended: Option<Region>,
    layout: RegisterLayout,
}

impl RegisterMap {
    /// Build a map from its RW and RO regions.
    ///
    /// Overlapping regions are rejected. Adjacent regions select a combined
    /// layout; everything else is `Disjoint`.
    pub fn new(rw: Region, ro: Region) -> ModbusResult<Self> {
        if rw.overlaps(&ro) {
            return Err(ModbusError::configuration(format!(
                "RW region {} overlaps RO region {}",
                rw, ro
            )));
        }

        let layout = if rw.is_empty() || ro.is_empty() {
            RegisterLayout::Disjoint
        } else if rw.end_exclusive() == ro.start as u32 {
            RegisterLayout::RwThenRo
        } else if ro.end_exclusive() == rw.start as u32 {
            RegisterLayout::RoThenRw
        } else {
            RegisterLayout::Disjoint
        };

        Ok(Self {
            rw,
            ro,
            extended: None,
            layout,
        })
    }

    /// Add the auxiliary read-only extended region
    pub fn with_extended(mut self, extended: Region) -> ModbusResult<Self> {
        if extended.overlaps(&self.rw) || extended.overlaps(&self.ro) {
            return Err(ModbusError::configuration(format!(
                "Extended region {} overlaps RW {} or RO {}",
                extended, self.rw, self.ro
            )));
        }
        self.extended = Some(extended).filter(|r| !r.is_empty());
        Ok(self)
    }

    pub fn layout(&self) -> RegisterLayout {
        self.layout
    }

    pub fn rw(&self) -> Region {
        self.rw
    }

    pub fn ro(&self) -> Region {
        self.ro
    }

    pub fn extended(&self) -> Option<Region> {
        self.extended
    }

    /// Combined RW+RO span, only for adjacent layouts
    pub fn combined(&self) -> Option<Region> {
        let start = match self.layout {
            RegisterLayout::RwThenRo => self.rw.start,
            RegisterLayout::RoThenRw => self.ro.start,
            RegisterLayout::Disjoint => return None,
        };
        Some(Region {
            start,
            total: self.rw.total + self.ro.total,
        })
    }

    /// Resolve a read of `count` registers starting at `start`.
    ///
    /// Returns `None` when any part of the range falls outside the
    /// configured regions, or for a zero-length request.
    pub fn resolve_read(&self, start: u16, count: u16) -> Option<ReadSpan> {
        let rw = (Bank::ReadWrite, self.rw);
        let ro = (Bank::ReadOnly, self.ro);

        let (primary, secondary) = match self.combined() {
            Some(span) if span.contains_range(start, count) => (rw, Some(ro)),
            Some(_) => self.resolve_extended(start, count)?,
            None if self.ro.contains_range(start, count) => (ro, None),
            None if self.rw.contains_range(start, count) => (rw, None),
            None => self.resolve_extended(start, count)?,
        };

        Some(ReadSpan {
            start,
            count,
            primary,
            secondary,
        })
    }

    fn resolve_extended(&self, start: u16, count: u16) -> Option<(Target, Option<Target>)> {
        self.extended
            .filter(|ext| ext.contains_range(start, count))
            .map(|ext| ((Bank::Extended, ext), None))
    }

    /// Resolve a write of `count` registers starting at `start`.
    ///
    /// Returns the offset of the first register inside the RW region.
    pub fn resolve_write(&self, start: u16, count: u16) -> Option<u16> {
        if self.rw.contains_range(start, count) {
            Some(start - self.rw.start)
        } else {
            None
        }
    }
}

type Target = (Bank, Region);

/// A resolved read: for each requested register, its bank and offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadSpan {
    start: u16,
    count: u16,
    primary: Target,
    /// Takes precedence over `primary` for registers it contains
    secondary: Option<Target>,
}

impl ReadSpan {
    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    /// Bank and physical offset of register `reg`
    #[inline]
    fn locate(&self, reg: u16) -> (Bank, usize) {
        match self.secondary {
            Some((bank, region)) if region.contains(reg) => (bank, region.offset_of(reg)),
            _ => (self.primary.0, self.primary.1.offset_of(reg)),
        }
    }

    /// `(bank, offset)` for every register, in request order
    pub fn iter(&self) -> impl Iterator<Item = (Bank, usize)> + '_ {
        (0..self.count).map(move |i| self.locate(self.start + i))
    }

    /// Whether any register of the span resolves to `bank`
    pub fn touches(&self, bank: Bank) -> bool {
        self.iter().any(|(b, _)| b == bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn region(start: u16, total: u16) -> Region {
        Region::new(start, total).unwrap()
    }

    #[test]
    fn test_region_bounds() {
        let r = region(10, 5);
        assert_eq!(r.end(), Some(14));
        assert!(r.contains(10));
        assert!(r.contains(14));
        assert!(!r.contains(15));
        assert!(r.contains_range(10, 5));
        assert!(!r.contains_range(10, 6));
        assert!(!r.contains_range(11, 5));
        assert!(!r.contains_range(10, 0));
        assert!(!r.contains_range(9, 2));

        assert_eq!(Region::empty().end(), None);
        assert!(Region::new(0xFFFF, 1).is_ok());
        assert!(Region::new(0xFFFF, 2).is_err());
    }

    #[test]
    fn test_region_at_top_of_space() {
        let r = region(0xFFF0, 16);
        assert_eq!(r.end(), Some(0xFFFF));
        assert!(r.contains_range(0xFFFF, 1));
        assert!(!r.contains_range(0xFFFF, 2));
    }

    #[test]
    fn test_layout_selection() {
        let map = RegisterMap::new(region(0, 1), region(1, 1)).unwrap();
        assert_eq!(map.layout(), RegisterLayout::RwThenRo);
        assert_eq!(map.combined(), Some(region(0, 2)));

        let map = RegisterMap::new(region(100, 10), region(90, 10)).unwrap();
        assert_eq!(map.layout(), RegisterLayout::RoThenRw);
        assert_eq!(map.combined(), Some(region(90, 20)));

        let map = RegisterMap::new(region(0, 10), region(100, 10)).unwrap();
        assert_eq!(map.layout(), RegisterLayout::Disjoint);
        assert_eq!(map.combined(), None);

        let map = RegisterMap::new(region(0, 10), Region::empty()).unwrap();
        assert_eq!(map.layout(), RegisterLayout::Disjoint);
    }

    #[test]
    fn test_overlap_rejected() {
        let err = RegisterMap::new(region(0, 10), region(9, 10)).unwrap_err();
        assert!(matches!(err, ModbusError::Configuration { .. }));

        let map = RegisterMap::new(region(0, 10), region(20, 10)).unwrap();
        assert!(map.with_extended(region(25, 10)).is_err());
        assert!(map.with_extended(region(5, 1)).is_err());
        assert!(map.with_extended(region(10, 10)).is_ok());
    }

    #[test]
    fn test_rw_then_ro_read_spans_both() {
        let map = RegisterMap::new(region(10, 3), region(13, 2)).unwrap();
        let span = map.resolve_read(11, 4).unwrap();
        let resolved: Vec<_> = span.iter().collect();
        assert_eq!(
            resolved,
            vec![
                (Bank::ReadWrite, 1),
                (Bank::ReadWrite, 2),
                (Bank::ReadOnly, 0),
                (Bank::ReadOnly, 1),
            ]
        );
        assert!(span.touches(Bank::ReadWrite));

        let ro_only = map.resolve_read(13, 2).unwrap();
        assert!(!ro_only.touches(Bank::ReadWrite));

        assert!(map.resolve_read(9, 2).is_none());
        assert!(map.resolve_read(14, 2).is_none());
        assert!(map.resolve_read(10, 6).is_none());
        assert!(map.resolve_read(10, 0).is_none());
    }

    #[test]
    fn test_ro_then_rw_read_spans_both() {
        let map = RegisterMap::new(region(5, 2), region(0, 5)).unwrap();
        let resolved: Vec<_> = map.resolve_read(3, 4).unwrap().iter().collect();
        assert_eq!(
            resolved,
            vec![
                (Bank::ReadOnly, 3),
                (Bank::ReadOnly, 4),
                (Bank::ReadWrite, 0),
                (Bank::ReadWrite, 1),
            ]
        );
        assert!(map.resolve_read(6, 2).is_none());
    }

    #[test]
    fn test_disjoint_rejects_mixed_reads() {
        let map = RegisterMap::new(region(0, 4), region(10, 4)).unwrap();

        let rw: Vec<_> = map.resolve_read(1, 3).unwrap().iter().collect();
        assert_eq!(
            rw,
            vec![(Bank::ReadWrite, 1), (Bank::ReadWrite, 2), (Bank::ReadWrite, 3)]
        );

        let ro: Vec<_> = map.resolve_read(12, 2).unwrap().iter().collect();
        assert_eq!(ro, vec![(Bank::ReadOnly, 2), (Bank::ReadOnly, 3)]);

        assert!(map.resolve_read(3, 8).is_none());
        assert!(map.resolve_read(4, 1).is_none());
        assert!(map.resolve_read(13, 2).is_none());
    }

    #[test]
    fn test_extended_region_reads() {
        let map = RegisterMap::new(region(0, 2), region(2, 2))
            .unwrap()
            .with_extended(region(0x1000, 8))
            .unwrap();

        let resolved: Vec<_> = map.resolve_read(0x1002, 2).unwrap().iter().collect();
        assert_eq!(resolved, vec![(Bank::Extended, 2), (Bank::Extended, 3)]);

        assert!(map.resolve_read(0x1007, 2).is_none());
        assert!(map.resolve_write(0x1000, 1).is_none());
    }

    #[test]
    fn test_resolve_write() {
        let map = RegisterMap::new(region(100, 10), region(110, 10)).unwrap();
        assert_eq!(map.resolve_write(100, 1), Some(0));
        assert_eq!(map.resolve_write(105, 5), Some(5));
        assert_eq!(map.resolve_write(105, 6), None);
        assert_eq!(map.resolve_write(110, 1), None);
        assert_eq!(map.resolve_write(99, 1), None);
        assert_eq!(map.resolve_write(100, 0), None);
    }

    proptest! {
        #[test]
        fn prop_adjacent_reads_resolve_in_order(
            rw_start in 0u16..1000,
            rw_total in 1u16..50,
            ro_total in 1u16..50,
            offset in 0u16..100,
            count in 1u16..100,
        ) {
            let ro_start = rw_start + rw_total;
            let map =
                RegisterMap::new(region(rw_start, rw_total), region(ro_start, ro_total)).unwrap();
            let start = rw_start + offset;
            let fits = offset as u32 + count as u32 <= (rw_total + ro_total) as u32;

            match map.resolve_read(start, count) {
                Some(span) => {
                    prop_assert!(fits);
                    for (i, (bank, off)) in span.iter().enumerate() {
                        let reg = start as usize + i;
                        if reg >= ro_start as usize {
                            prop_assert_eq!(bank, Bank::ReadOnly);
                            prop_assert_eq!(off, reg - ro_start as usize);
                        } else {
                            prop_assert_eq!(bank, Bank::ReadWrite);
                            prop_assert_eq!(off, reg - rw_start as usize);
                        }
                    }
                }
                None => prop_assert!(!fits),
            }
        }

        #[test]
        fn prop_writes_stay_inside_rw(
            rw_start in 0u16..1000,
            rw_total in 1u16..50,
            start in 0u16..1100,
            count in 0u16..60,
        ) {
            let map = RegisterMap::new(region(rw_start, rw_total), region(2000, 10)).unwrap();
            let inside = count != 0
                && start >= rw_start
                && start as u32 + count as u32 <= rw_start as u32 + rw_total as u32;
            prop_assert_eq!(map.resolve_write(start, count).is_some(), inside);
            if let Some(offset) = map.resolve_write(start, count) {
                prop_assert_eq!(offset, start - rw_start);
            }
        }
    }
}
