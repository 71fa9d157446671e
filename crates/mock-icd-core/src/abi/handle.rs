use std::collections::HashMap;
use std::ptr::NonNull;

/// Value the loader expects in the first word of every dispatchable object.
pub const ICD_LOADER_MAGIC: usize = 0x01CD_C0DE;

/// Distance between two consecutive non-dispatchable handles of the same kind.
pub const NON_DISPATCHABLE_STRIDE: u64 = 0xdead_beef;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchableKind {
    Instance,
    PhysicalDevice,
    Device,
    Queue,
    CommandBuffer,
}

/// Fixed-layout storage behind a dispatchable handle.
///
/// The loader checks `loader_data` for [`ICD_LOADER_MAGIC`] and then overwrites it with its own
/// dispatch table pointer, so nothing in the driver reads it back. Object data lives in the
/// owning [`DispatchArena`] slot named by `slot`.
#[repr(C)]
#[derive(Debug)]
pub struct DispatchHeader {
    pub loader_data: usize,
    pub kind: DispatchableKind,
    pub slot: u32,
}

struct Slot<T> {
    header: NonNull<DispatchHeader>,
    record: Option<T>,
}

impl<T> Drop for Slot<T> {
    fn drop(&mut self) {
        // SAFETY: produced by Box::into_raw in DispatchArena::insert and freed only here.
        unsafe { drop(Box::from_raw(self.header.as_ptr())) }
    }
}

/// Arena of records reachable through dispatchable handles.
///
/// Handles are the addresses of boxed [`DispatchHeader`]s. Destroyed slots keep their header
/// allocated until the arena is dropped, so a stale handle can never alias a newer object and
/// lookups never dereference caller-supplied pointers.
pub struct DispatchArena<T> {
    kind: DispatchableKind,
    slots: Vec<Slot<T>>,
    index: HashMap<u64, u32>,
}

impl<T> DispatchArena<T> {
    pub fn new(kind: DispatchableKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn kind(&self) -> DispatchableKind {
        self.kind
    }

    /// Stores `record` and returns the raw handle value pointing at its header.
    pub fn insert(&mut self, record: T) -> u64 {
        let slot = self.slots.len() as u32;
        let header = Box::new(DispatchHeader {
            loader_data: ICD_LOADER_MAGIC,
            kind: self.kind,
            slot,
        });
        // SAFETY: Box::into_raw never returns null.
        let header = unsafe { NonNull::new_unchecked(Box::into_raw(header)) };
        let raw = header.as_ptr() as usize as u64;
        self.slots.push(Slot {
            header,
            record: Some(record),
        });
        self.index.insert(raw, slot);
        raw
    }

    fn live_slot(&self, raw: u64) -> Option<usize> {
        self.index.get(&raw).map(|slot| *slot as usize)
    }

    pub fn contains(&self, raw: u64) -> bool {
        self.index.contains_key(&raw)
    }

    pub fn get(&self, raw: u64) -> Option<&T> {
        let slot = self.live_slot(raw)?;
        self.slots[slot].record.as_ref()
    }

    pub fn get_mut(&mut self, raw: u64) -> Option<&mut T> {
        let slot = self.live_slot(raw)?;
        self.slots[slot].record.as_mut()
    }

    /// Removes the record, leaving the header allocated as a tombstone.
    pub fn remove(&mut self, raw: u64) -> Option<T> {
        let slot = self.index.remove(&raw)? as usize;
        self.slots[slot].record.take()
    }

    /// Removes every live record matching `remove` and returns their handles.
    pub fn remove_where(&mut self, mut remove: impl FnMut(&T) -> bool) -> Vec<u64> {
        let mut removed = Vec::new();
        for slot in &mut self.slots {
            if slot.record.as_ref().is_some_and(&mut remove) {
                slot.record = None;
                let raw = slot.header.as_ptr() as usize as u64;
                self.index.remove(&raw);
                removed.push(raw);
            }
        }
        removed
    }

    /// Live records in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> {
        self.slots.iter().filter_map(|slot| {
            slot.record
                .as_ref()
                .map(|record| (slot.header.as_ptr() as usize as u64, record))
        })
    }

    pub fn handles(&self) -> Vec<u64> {
        self.iter().map(|(raw, _)| raw).collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Reads the header behind a live handle.
    pub fn header(&self, raw: u64) -> Option<&DispatchHeader> {
        let slot = self.live_slot(raw)?;
        // SAFETY: the header stays allocated for the arena's lifetime.
        Some(unsafe { self.slots[slot].header.as_ref() })
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for DispatchArena<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchArena")
            .field("kind", &self.kind)
            .field("live", &self.len())
            .field("allocated", &self.slots.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonDispatchableKind {
    Surface,
    Swapchain,
    DebugMessenger,
    CommandPool,
    Display,
}

impl NonDispatchableKind {
    /// First counter value. Distinct per kind so a handle passed as the wrong kind never matches.
    fn base(self) -> u64 {
        match self {
            NonDispatchableKind::Surface => 0x1000_0000_0000_0000,
            NonDispatchableKind::Swapchain => 0x2000_0000_0000_0000,
            NonDispatchableKind::DebugMessenger => 0x3000_0000_0000_0000,
            NonDispatchableKind::CommandPool => 0x4000_0000_0000_0000,
            NonDispatchableKind::Display => 0x5000_0000_0000_0000,
        }
    }
}

/// Records keyed by opaque 64-bit non-dispatchable handles.
#[derive(Debug)]
pub struct HandleSet<T> {
    kind: NonDispatchableKind,
    counter: u64,
    live: Vec<(u64, T)>,
}

impl<T> HandleSet<T> {
    pub fn new(kind: NonDispatchableKind) -> Self {
        Self {
            kind,
            counter: kind.base(),
            live: Vec::new(),
        }
    }

    pub fn kind(&self) -> NonDispatchableKind {
        self.kind
    }

    pub fn insert(&mut self, record: T) -> u64 {
        self.counter = self.counter.wrapping_add(NON_DISPATCHABLE_STRIDE);
        self.live.push((self.counter, record));
        self.counter
    }

    fn position(&self, raw: u64) -> Option<usize> {
        self.live.iter().position(|(handle, _)| *handle == raw)
    }

    pub fn contains(&self, raw: u64) -> bool {
        self.position(raw).is_some()
    }

    pub fn get(&self, raw: u64) -> Option<&T> {
        self.position(raw).map(|i| &self.live[i].1)
    }

    pub fn get_mut(&mut self, raw: u64) -> Option<&mut T> {
        self.position(raw).map(|i| &mut self.live[i].1)
    }

    pub fn remove(&mut self, raw: u64) -> Option<T> {
        self.position(raw).map(|i| self.live.remove(i).1)
    }

    pub fn remove_where(&mut self, mut remove: impl FnMut(&T) -> bool) -> Vec<u64> {
        let mut removed = Vec::new();
        self.live.retain(|(handle, record)| {
            if remove(record) {
                removed.push(*handle);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> {
        self.live.iter().map(|(handle, record)| (*handle, record))
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
