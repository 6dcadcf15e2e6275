//! Measured header/footer band heights per page number

use rustc_hash::FxHashMap;

/// Slot holding the height of non-overridden (default) bands
pub const DEFAULT_SLOT: u32 = 0;

/// Which band a height belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Header,
    Footer,
}

/// Header/footer heights observed on renders of the current decorations.
///
/// Survives ordinary edits; cleared when page size or margins change since
/// band text may wrap differently.
#[derive(Debug, Clone, Default)]
pub struct PageHeightCache {
    headers: FxHashMap<u32, f32>,
    footers: FxHashMap<u32, f32>,
}

impl PageHeightCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self, band: Band) -> &FxHashMap<u32, f32> {
        match band {
            Band::Header => &self.headers,
            Band::Footer => &self.footers,
        }
    }

    fn slots_mut(&mut self, band: Band) -> &mut FxHashMap<u32, f32> {
        match band {
            Band::Header => &mut self.headers,
            Band::Footer => &mut self.footers,
        }
    }

    /// Height for a page, falling back to the default slot, then 0
    pub fn get(&self, band: Band, page_number: u32) -> f32 {
        let slots = self.slots(band);
        slots
            .get(&page_number)
            .or_else(|| slots.get(&DEFAULT_SLOT))
            .copied()
            .unwrap_or(0.0)
    }

    /// Record a measured height. Returns true if the stored value changed.
    pub fn set(&mut self, band: Band, page_number: u32, height: f32) -> bool {
        if !height.is_finite() || height < 0.0 {
            return false;
        }
        let slots = self.slots_mut(band);
        // Sub-pixel jitter is not a change, and does not move the stored value
        if let Some(previous) = slots.get(&page_number) {
            if (previous - height).abs() <= 0.5 {
                return false;
            }
        }
        slots.insert(page_number, height);
        true
    }

    pub fn header(&self, page_number: u32) -> f32 {
        self.get(Band::Header, page_number)
    }

    pub fn footer(&self, page_number: u32) -> f32 {
        self.get(Band::Footer, page_number)
    }

    /// Forget one band's height in one slot
    pub fn remove(&mut self, band: Band, page_number: u32) {
        self.slots_mut(band).remove(&page_number);
    }

    /// Forget both band heights of one slot
    pub fn invalidate(&mut self, page_number: u32) {
        self.headers.remove(&page_number);
        self.footers.remove(&page_number);
    }

    pub fn clear(&mut self) {
        self.headers.clear();
        self.footers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.footers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_to_default_slot() {
        let mut cache = PageHeightCache::new();
        assert_eq!(cache.header(3), 0.0);

        cache.set(Band::Header, DEFAULT_SLOT, 24.0);
        cache.set(Band::Header, 3, 48.0);

        assert_eq!(cache.header(1), 24.0);
        assert_eq!(cache.header(3), 48.0);
        assert_eq!(cache.footer(3), 0.0);
    }

    #[test]
    fn test_set_reports_changes() {
        let mut cache = PageHeightCache::new();
        assert!(cache.set(Band::Footer, 0, 20.0));
        assert!(!cache.set(Band::Footer, 0, 20.2));
        assert!(cache.set(Band::Footer, 0, 32.0));
        assert!(!cache.set(Band::Footer, 0, f32::NAN));
    }

    #[test]
    fn test_sub_pixel_drift_keeps_stored_height() {
        let mut cache = PageHeightCache::new();
        cache.set(Band::Header, 0, 20.0);

        // Each step stays under the threshold; the accumulated drift does not
        assert!(!cache.set(Band::Header, 0, 20.4));
        assert!(!cache.set(Band::Header, 0, 20.3));
        assert_eq!(cache.header(0), 20.0);
        assert!(cache.set(Band::Header, 0, 20.8));
        assert_eq!(cache.header(0), 20.8);
    }

    #[test]
    fn test_remove_one_band() {
        let mut cache = PageHeightCache::new();
        cache.set(Band::Header, 0, 24.0);
        cache.set(Band::Footer, 0, 18.0);

        cache.remove(Band::Header, 0);
        assert_eq!(cache.header(1), 0.0);
        assert_eq!(cache.footer(1), 18.0);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache = PageHeightCache::new();
        cache.set(Band::Header, 0, 20.0);
        cache.set(Band::Header, 2, 40.0);
        cache.set(Band::Footer, 2, 30.0);

        cache.invalidate(2);
        assert_eq!(cache.header(2), 20.0);
        assert_eq!(cache.footer(2), 0.0);

        cache.clear();
        assert!(cache.is_empty());
    }
}
