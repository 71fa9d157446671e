use crate::abi::handle::*;

#[test]
fn test_dispatchable_handle_starts_with_loader_magic() {
    let mut arena = DispatchArena::new(DispatchableKind::Device);
    let raw = arena.insert("device-a");
    assert_ne!(raw, 0);
    // The loader reads the first word through the handle itself.
    let first_word = unsafe { *(raw as usize as *const usize) };
    assert_eq!(first_word, ICD_LOADER_MAGIC);
    let header = arena.header(raw).unwrap();
    assert_eq!(header.kind, DispatchableKind::Device);
    assert_eq!(header.slot, 0);
}

#[test]
fn test_lookup_and_remove() {
    let mut arena = DispatchArena::new(DispatchableKind::Instance);
    let a = arena.insert(1u32);
    let b = arena.insert(2u32);
    assert_ne!(a, b);
    assert_eq!(arena.get(a), Some(&1));
    assert_eq!(arena.len(), 2);

    assert_eq!(arena.remove(a), Some(1));
    assert!(!arena.contains(a));
    assert_eq!(arena.get(a), None);
    assert_eq!(arena.remove(a), None, "second removal finds nothing");
    assert_eq!(arena.handles(), vec![b]);
}

#[test]
fn test_destroyed_handle_is_never_reissued() {
    let mut arena = DispatchArena::new(DispatchableKind::Device);
    let first = arena.insert(());
    arena.remove(first);
    for _ in 0..32 {
        let next = arena.insert(());
        assert_ne!(next, first, "tombstoned header keeps its address reserved");
    }
}

#[test]
fn test_unknown_pointer_lookup_does_not_dereference() {
    let arena: DispatchArena<u8> = DispatchArena::new(DispatchableKind::Queue);
    assert!(arena.get(0x1234).is_none());
    assert!(arena.header(0x1234).is_none());
}

#[test]
fn test_remove_where_cascades() {
    let mut arena = DispatchArena::new(DispatchableKind::Queue);
    let keep = arena.insert(("dev-1", 0));
    let drop_a = arena.insert(("dev-2", 0));
    let drop_b = arena.insert(("dev-2", 1));
    let removed = arena.remove_where(|(device, _)| *device == "dev-2");
    assert_eq!(removed, vec![drop_a, drop_b]);
    assert_eq!(arena.handles(), vec![keep]);
}

#[test]
fn test_non_dispatchable_values_are_strided_and_distinct_per_kind() {
    let mut surfaces = HandleSet::new(NonDispatchableKind::Surface);
    let mut swapchains = HandleSet::new(NonDispatchableKind::Swapchain);
    let s1 = surfaces.insert(());
    let s2 = surfaces.insert(());
    let w1 = swapchains.insert(());
    assert_ne!(s1, 0);
    assert_eq!(s2 - s1, NON_DISPATCHABLE_STRIDE);
    assert_ne!(s1, w1);

    assert!(surfaces.remove(s1).is_some());
    assert!(surfaces.remove(s1).is_none());
    let s3 = surfaces.insert(());
    assert_ne!(s3, s1, "counter keeps moving forward after removal");
}

#[test]
fn test_handle_set_remove_where() {
    let mut set = HandleSet::new(NonDispatchableKind::DebugMessenger);
    let a = set.insert(1);
    let b = set.insert(2);
    let c = set.insert(1);
    assert_eq!(set.remove_where(|owner| *owner == 1), vec![a, c]);
    assert_eq!(set.iter().map(|(h, _)| h).collect::<Vec<_>>(), vec![b]);
}
