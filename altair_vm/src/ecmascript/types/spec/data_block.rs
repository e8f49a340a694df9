// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.2.9 Data Blocks](https://tc39.es/ecma262/#sec-data-blocks)

use std::{
    alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout},
    ptr::{read_unaligned, write_unaligned, NonNull},
};

/// # Data Block
///
/// A distinct and mutable sequence of byte-sized (8 bit) numeric values,
/// created with a fixed number of bytes that each have the initial value
/// 0. The block may instead adopt caller-supplied bytes, in which case it
/// owns and frees them through their original `Box` allocation.
///
/// The `ptr` points to a continuous buffer of bytes, the length of which
/// is determined by `byte_length`. The pointer can be None if the
/// capacity of the buffer is zero.
#[derive(Debug)]
pub struct DataBlock {
    ptr: Option<NonNull<u8>>,
    byte_length: u32,
    /// True when the bytes were adopted from a `Box<[u8]>` and must be
    /// freed through it rather than through our own layout.
    external: bool,
}

impl Drop for DataBlock {
    fn drop(&mut self) {
        let Some(ptr) = self.ptr else {
            return;
        };
        if self.external {
            // SAFETY: Adopted pointers come from Box::into_raw of a boxed
            // slice of exactly byte_length bytes.
            drop(unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    ptr.as_ptr(),
                    self.byte_length as usize,
                ))
            });
        } else {
            let layout = Layout::from_size_align(self.byte_length as usize, 8).unwrap();
            // SAFETY: Owned pointers were allocated with this exact layout.
            unsafe { dealloc(ptr.as_ptr(), layout) }
        }
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for i8 {}
    impl Sealed for u16 {}
    impl Sealed for i16 {}
    impl Sealed for u32 {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Element types a typed view can interpret block bytes as. The 64-bit
/// integer kinds are absent; they belong to the BigInt surface.
pub trait Viewable: private::Sealed + Copy {
    /// Reverse the byte order of the value, bit pattern for bit pattern.
    fn reverse_bytes(self) -> Self;
    /// Convert a ToNumber result to this element type: integers wrap
    /// modulo their width, floats round to their precision.
    fn from_f64(value: f64) -> Self;
    fn into_f64(self) -> f64;
}

/// Truncate a double toward zero and wrap it into `2.0f64.powi(bits)`.
/// NaN and the infinities go to zero, as ToInt32 and friends demand.
fn wrap_to_unsigned(value: f64, modulus: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let truncated = value.trunc();
    let wrapped = truncated % modulus;
    if wrapped < 0.0 { wrapped + modulus } else { wrapped }
}

macro_rules! viewable_int {
    ($unsigned:ty, $signed:ty, $modulus:expr) => {
        impl Viewable for $unsigned {
            fn reverse_bytes(self) -> Self {
                self.swap_bytes()
            }

            fn from_f64(value: f64) -> Self {
                wrap_to_unsigned(value, $modulus) as Self
            }

            fn into_f64(self) -> f64 {
                self as f64
            }
        }

        impl Viewable for $signed {
            fn reverse_bytes(self) -> Self {
                self.swap_bytes()
            }

            fn from_f64(value: f64) -> Self {
                <$unsigned>::from_f64(value) as Self
            }

            fn into_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

viewable_int!(u8, i8, 256.0);
viewable_int!(u16, i16, 65536.0);
viewable_int!(u32, i32, 4294967296.0);

impl Viewable for f32 {
    fn reverse_bytes(self) -> Self {
        Self::from_bits(self.to_bits().swap_bytes())
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn into_f64(self) -> f64 {
        self as f64
    }
}

impl Viewable for f64 {
    fn reverse_bytes(self) -> Self {
        Self::from_bits(self.to_bits().swap_bytes())
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn into_f64(self) -> f64 {
        self
    }
}

impl DataBlock {
    /// ### [6.2.9.1 CreateByteDataBlock ( size )](https://tc39.es/ecma262/#sec-createbytedatablock)
    ///
    /// All of the bytes of the new block are 0. Allocation failure is
    /// fatal; size validation against RangeError happens in the callers
    /// that take untrusted lengths.
    pub fn new(len: u32) -> Self {
        let ptr = if len == 0 {
            None
        } else {
            let layout = Layout::from_size_align(len as usize, 8).unwrap();
            // SAFETY: Size of allocation is non-zero.
            let data = unsafe { alloc_zeroed(layout) };
            if data.is_null() {
                handle_alloc_error(layout);
            }
            debug_assert_eq!(data.align_offset(8), 0);
            NonNull::new(data)
        };
        Self {
            ptr,
            byte_length: len,
            external: false,
        }
    }

    /// Adopt caller-supplied bytes, taking ownership of the allocation.
    pub fn from_bytes(bytes: Box<[u8]>) -> Self {
        let byte_length = u32::try_from(bytes.len()).expect("external buffer too large");
        if byte_length == 0 {
            return Self::new(0);
        }
        let ptr = Box::into_raw(bytes) as *mut u8;
        Self {
            ptr: NonNull::new(ptr),
            byte_length,
            external: true,
        }
    }

    pub fn len(&self) -> u32 {
        self.byte_length
    }

    pub fn is_empty(&self) -> bool {
        self.byte_length == 0
    }

    fn in_bounds<T: Viewable>(&self, byte_offset: u32) -> bool {
        let size = size_of::<T>() as u32;
        byte_offset as u64 + size as u64 <= self.byte_length as u64
    }

    /// Read a `T` in native byte order. None when the access would run
    /// past the end of the block.
    pub fn get<T: Viewable>(&self, byte_offset: u32) -> Option<T> {
        if !self.in_bounds::<T>(byte_offset) {
            return None;
        }
        self.ptr.map(|data| {
            // SAFETY: The data is properly initialized, and the T being
            // read is checked to be fully within the allocation.
            unsafe { read_unaligned(data.as_ptr().add(byte_offset as usize).cast()) }
        })
    }

    /// Write a `T` in native byte order. Out-of-range writes are dropped;
    /// the return value reports whether the write landed.
    pub fn set<T: Viewable>(&mut self, byte_offset: u32, value: T) -> bool {
        if !self.in_bounds::<T>(byte_offset) {
            return false;
        }
        let Some(data) = self.ptr else {
            return false;
        };
        // SAFETY: The T being written is checked to be fully within the
        // allocation.
        unsafe { write_unaligned(data.as_ptr().add(byte_offset as usize).cast(), value) };
        true
    }

    /// Read with an explicit byte order, as DataView does.
    pub fn get_endian<T: Viewable>(&self, byte_offset: u32, little_endian: bool) -> Option<T> {
        self.get::<T>(byte_offset).map(|value| {
            if little_endian == cfg!(target_endian = "little") {
                value
            } else {
                value.reverse_bytes()
            }
        })
    }

    /// Write with an explicit byte order, as DataView does.
    pub fn set_endian<T: Viewable>(
        &mut self,
        byte_offset: u32,
        value: T,
        little_endian: bool,
    ) -> bool {
        let value = if little_endian == cfg!(target_endian = "little") {
            value
        } else {
            value.reverse_bytes()
        };
        self.set::<T>(byte_offset, value)
    }
}

#[test]
fn new_data_block() {
    let db = DataBlock::new(0);
    assert_eq!(db.len(), 0);
    assert_eq!(db.get::<u8>(0), None);

    let db = DataBlock::new(8);
    assert_eq!(db.len(), 8);
    for i in 0..8 {
        assert_eq!(db.get::<u8>(i as u32), Some(0));
    }
}

#[test]
fn data_block_set() {
    let mut db = DataBlock::new(8);
    for i in 0..8 {
        assert!(db.set::<u8>(i as u32, i + 1));
    }
    for i in 0..8 {
        assert_eq!(db.get::<u8>(i as u32), Some(i + 1));
    }
    assert!(!db.set::<u8>(8, 1));
    assert!(!db.set::<u32>(5, 1));
    assert_eq!(db.get::<u32>(5), None);
}

#[test]
fn data_block_adopts_external_bytes() {
    let bytes: Box<[u8]> = vec![1, 2, 3, 4].into_boxed_slice();
    let db = DataBlock::from_bytes(bytes);
    assert_eq!(db.len(), 4);
    assert_eq!(db.get::<u8>(0), Some(1));
    assert_eq!(db.get::<u8>(3), Some(4));
    assert_eq!(db.get::<u8>(4), None);
}

#[test]
fn data_block_endianness() {
    let mut db = DataBlock::new(8);
    assert!(db.set_endian::<u16>(0, 0x1234, false));
    assert_eq!(db.get::<u8>(0), Some(0x12));
    assert_eq!(db.get::<u8>(1), Some(0x34));
    assert_eq!(db.get_endian::<u16>(0, false), Some(0x1234));
    assert_eq!(db.get_endian::<u16>(0, true), Some(0x3412));

    assert!(db.set_endian::<u32>(4, 0xdeadbeef, true));
    assert_eq!(db.get::<u8>(4), Some(0xef));
    assert_eq!(db.get_endian::<u32>(4, true), Some(0xdeadbeef));
}

#[test]
fn viewable_wrapping() {
    assert_eq!(u8::from_f64(70000.0), 70000u32 as u8);
    assert_eq!(i16::from_f64(70000.0), (70000 % 65536) as i16);
    assert_eq!(u16::from_f64(-1.0), 65535);
    assert_eq!(i32::from_f64(f64::NAN), 0);
    assert_eq!(u8::from_f64(f64::INFINITY), 0);
    assert_eq!(u8::from_f64(-3.7), 253);
    assert_eq!(f32::from_f64(1.5), 1.5f32);
}
