use ash::vk;

/// Runs the count-then-fill protocol over `len` elements.
///
/// `write(i)` stores element `i`; it is only called for indices below the amount reported back.
fn fill_with(
    len: usize,
    count: Option<&mut u32>,
    has_output: bool,
    mut write: impl FnMut(usize),
) -> vk::Result {
    let Some(count) = count else {
        return vk::Result::ERROR_OUT_OF_HOST_MEMORY;
    };
    let available = u32::try_from(len).unwrap_or(u32::MAX);
    if !has_output {
        *count = available;
        return vk::Result::SUCCESS;
    }

    let to_write = available.min(*count);
    for i in 0..to_write as usize {
        write(i);
    }
    *count = to_write;
    if to_write < available {
        vk::Result::INCOMPLETE
    } else {
        vk::Result::SUCCESS
    }
}

/// Two-call enumeration into a Rust slice.
///
/// `count` is the caller's capacity on the way in and the number of elements written (or
/// available, when `output` is `None`) on the way out. A capacity larger than `output` is treated
/// as `output.len()`.
pub fn fill_slice<T, U>(
    source: &[T],
    mut count: Option<&mut u32>,
    output: Option<&mut [U]>,
    mut convert: impl FnMut(&T) -> U,
) -> vk::Result {
    match output {
        None => fill_with(source.len(), count, false, |_| {}),
        Some(out) => {
            if let Some(capacity) = count.as_deref_mut() {
                *capacity = (*capacity).min(u32::try_from(out.len()).unwrap_or(u32::MAX));
            }
            fill_with(source.len(), count, true, |i| out[i] = convert(&source[i]))
        }
    }
}

/// Two-call enumeration into caller memory, as used by every `vkEnumerate*`-style entry point.
///
/// # Safety
/// `p_count` must be null or valid for reads and writes. When `p_out` is non-null it must be
/// valid for `*p_count` writes of `U`.
pub unsafe fn fill_raw<T, U>(
    source: &[T],
    p_count: *mut u32,
    p_out: *mut U,
    mut convert: impl FnMut(&T) -> U,
) -> vk::Result {
    // SAFETY: guaranteed by the caller.
    let count = unsafe { p_count.as_mut() };
    fill_with(source.len(), count, !p_out.is_null(), |i| {
        // SAFETY: i < *p_count, see fill_with.
        unsafe { p_out.add(i).write(convert(&source[i])) }
    })
}

/// [`fill_raw`] for elements stored in their ABI form.
///
/// # Safety
/// Same as [`fill_raw`].
pub unsafe fn fill_raw_copied<T: Copy>(source: &[T], p_count: *mut u32, p_out: *mut T) -> vk::Result {
    unsafe { fill_raw(source, p_count, p_out, |value| *value) }
}

/// [`fill_raw`] for extensible output structures: `update` fills the caller's element in place so
/// its `s_type` and `p_next` survive.
///
/// # Safety
/// Same as [`fill_raw`], and every element the caller passes in must be initialised.
pub unsafe fn fill_raw_in_place<T, U>(
    source: &[T],
    p_count: *mut u32,
    p_out: *mut U,
    mut update: impl FnMut(&T, &mut U),
) -> vk::Result {
    // SAFETY: guaranteed by the caller.
    let count = unsafe { p_count.as_mut() };
    fill_with(source.len(), count, !p_out.is_null(), |i| {
        // SAFETY: i < *p_count and the element is initialised.
        update(&source[i], unsafe { &mut *p_out.add(i) })
    })
}
