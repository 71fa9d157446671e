use ash::vk;
use std::ptr;

use crate::abi::enumerate::{fill_raw, fill_raw_copied, fill_slice};

#[test]
fn test_null_count_pointer_is_out_of_host_memory() {
    let source = [1u32, 2, 3];
    let mut out = [0u32; 3];
    let result = unsafe { fill_raw_copied(&source, ptr::null_mut(), out.as_mut_ptr()) };
    assert_eq!(result, vk::Result::ERROR_OUT_OF_HOST_MEMORY);
    assert_eq!(out, [0, 0, 0], "nothing may be written without a count");
}

#[test]
fn test_count_query_is_idempotent() {
    let source = [10u32, 20, 30, 40];
    let mut first = 0u32;
    let mut second = 99u32;
    assert_eq!(unsafe { fill_raw_copied(&source, &mut first, ptr::null_mut()) }, vk::Result::SUCCESS);
    assert_eq!(unsafe { fill_raw_copied(&source, &mut second, ptr::null_mut()) }, vk::Result::SUCCESS);
    assert_eq!(first, 4);
    assert_eq!(first, second);
}

#[test]
fn test_truncated_fill_returns_incomplete() {
    let source = [1u32, 2, 3, 4, 5];
    let mut out = [0u32; 5];
    let mut count = 2u32;
    let result = unsafe { fill_raw_copied(&source, &mut count, out.as_mut_ptr()) };
    assert_eq!(result, vk::Result::INCOMPLETE);
    assert_eq!(count, 2);
    assert_eq!(out, [1, 2, 0, 0, 0], "only the first k entries are written");
}

#[test]
fn test_oversized_capacity_reports_actual_count() {
    let source = [7u32, 8];
    let mut out = [0u32; 6];
    let mut count = 6u32;
    let result = unsafe { fill_raw_copied(&source, &mut count, out.as_mut_ptr()) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(count, 2);
    assert_eq!(&out[..2], &[7, 8]);
}

#[test]
fn test_exact_capacity_is_success() {
    let source = [3u32, 4, 5];
    let mut out = [0u32; 3];
    let mut count = 3u32;
    assert_eq!(
        unsafe { fill_raw_copied(&source, &mut count, out.as_mut_ptr()) },
        vk::Result::SUCCESS
    );
    assert_eq!(out, source);
}

#[test]
fn test_zero_capacity_with_output_is_incomplete() {
    let source = [1u32];
    let mut out = [0u32; 1];
    let mut count = 0u32;
    assert_eq!(
        unsafe { fill_raw_copied(&source, &mut count, out.as_mut_ptr()) },
        vk::Result::INCOMPLETE
    );
    assert_eq!(count, 0);
    assert_eq!(out, [0]);
}

#[test]
fn test_empty_source_is_success() {
    let source: [u32; 0] = [];
    let mut out = [0u32; 2];
    let mut count = 2u32;
    assert_eq!(
        unsafe { fill_raw_copied(&source, &mut count, out.as_mut_ptr()) },
        vk::Result::SUCCESS
    );
    assert_eq!(count, 0);
}

#[test]
fn test_conversion_extracts_abi_value() {
    struct Rich {
        name: &'static str,
        value: u32,
    }
    let source = [Rich { name: "a", value: 11 }, Rich { name: "bb", value: 22 }];
    let mut out = [0usize; 2];
    let mut count = 2u32;
    let result = unsafe { fill_raw(&source, &mut count, out.as_mut_ptr(), |r| r.name.len() + r.value as usize) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(out, [12, 24]);
}

#[test]
fn test_slice_form_clamps_capacity_to_buffer() {
    let source = [1u8, 2, 3, 4];
    let mut out = [0u8; 2];
    let mut count = 10u32;
    let result = fill_slice(&source, Some(&mut count), Some(&mut out[..]), |v| *v);
    assert_eq!(result, vk::Result::INCOMPLETE);
    assert_eq!(count, 2);
    assert_eq!(out, [1, 2]);
}

#[test]
fn test_slice_form_count_only_and_missing_count() {
    let source = [1u8, 2, 3];
    let mut count = 0u32;
    assert_eq!(fill_slice::<u8, u8>(&source, Some(&mut count), None, |v| *v), vk::Result::SUCCESS);
    assert_eq!(count, 3);
    assert_eq!(
        fill_slice::<u8, u8>(&source, None, None, |v| *v),
        vk::Result::ERROR_OUT_OF_HOST_MEMORY
    );
}
