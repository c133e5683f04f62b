//! Named-field access shared by the status records.
//!
//! Attribute dictionaries address record fields by their C names
//! (`st_size`, `f_bavail`, ...). Every record declared through
//! [`abi_record!`] gets that lookup plus a layout descriptor built from
//! `offset_of!`, so the tests can hold each variant against its
//! reference offsets.

use crate::time::TimeKind;

/// Size and field offsets of one record variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub name: &'static str,
    pub size: usize,
    pub fields: &'static [(&'static str, usize)],
}

impl RecordLayout {
    pub fn offset_of(&self, field: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, offset)| *offset)
    }
}

/// A plain-data native record with integer fields addressable by name.
pub trait NativeRecord: Copy + Default {
    /// Store `value` into the named field, narrowing to the field's width.
    ///
    /// Returns `false` when the record has no such field.
    fn set_field(&mut self, name: &str, value: i64) -> bool;

    fn get_field(&self, name: &str) -> Option<i64>;

    fn layout() -> RecordLayout
    where
        Self: Sized;
}

/// A file-status record: named integer fields plus timestamp pairs.
pub trait StatRecord: NativeRecord {
    /// Returns `false` when this variant has no slot for `kind`
    /// (birth time on Linux).
    fn set_time(&mut self, kind: TimeKind, sec: i64, nsec: i64) -> bool;

    fn get_time(&self, kind: TimeKind) -> Option<(i64, i64)>;
}

/// Declare a `#[repr(C)]` record and its [`NativeRecord`] impl.
///
/// `fields { .. }` lists the fields reachable by name; padding and
/// reserved words stay out of it. The optional `times { .. }` list maps
/// [`TimeKind`]s to timespec fields and adds a [`StatRecord`] impl.
macro_rules! abi_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* pub $field:ident : $ty:ty, )*
        }
        fields { $( $named:ident ),* $(,)? }
        times { $( $kind:ident => $tfield:ident ),* $(,)? }
    ) => {
        $crate::record::abi_record! {
            $(#[$meta])*
            pub struct $name {
                $( $(#[$fmeta])* pub $field : $ty, )*
            }
            fields { $( $named ),* }
        }

        impl $crate::record::StatRecord for $name {
            #[allow(unreachable_patterns)]
            fn set_time(&mut self, kind: $crate::time::TimeKind, sec: i64, nsec: i64) -> bool {
                match kind {
                    $(
                        $crate::time::TimeKind::$kind => {
                            self.$tfield = $crate::time::TimespecField::from_parts(sec, nsec);
                            true
                        }
                    )*
                    _ => false,
                }
            }

            #[allow(unreachable_patterns)]
            fn get_time(&self, kind: $crate::time::TimeKind) -> Option<(i64, i64)> {
                match kind {
                    $(
                        $crate::time::TimeKind::$kind => {
                            let pair = self.$tfield;
                            Some($crate::time::TimespecField::parts(&pair))
                        }
                    )*
                    _ => None,
                }
            }
        }
    };
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* pub $field:ident : $ty:ty, )*
        }
        fields { $( $named:ident ),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field : $ty, )*
        }

        impl $name {
            /// `(field, byte offset)` for every field in declaration order.
            pub const FIELDS: &'static [(&'static str, usize)] = &[
                $( (stringify!($field), ::core::mem::offset_of!($name, $field)), )*
            ];
        }

        impl $crate::record::NativeRecord for $name {
            fn set_field(&mut self, name: &str, value: i64) -> bool {
                match name {
                    $(
                        stringify!($named) => {
                            self.$named = value as _;
                            true
                        }
                    )*
                    _ => false,
                }
            }

            fn get_field(&self, name: &str) -> Option<i64> {
                match name {
                    $( stringify!($named) => Some(self.$named as i64), )*
                    _ => None,
                }
            }

            fn layout() -> $crate::record::RecordLayout {
                $crate::record::RecordLayout {
                    name: stringify!($name),
                    size: ::core::mem::size_of::<$name>(),
                    fields: Self::FIELDS,
                }
            }
        }
    };
}

pub(crate) use abi_record;
