use num_traits::{One, PrimInt};

/// Trait implemented by user-defined flag enums.
///
/// The enum's discriminant (via `#[repr(u8)]`) determines the bit index.
/// You choose the backing integer type via the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // Equivalent to: 1 << index
        // NOTE: Ensure your `bit_index()` is < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container, e.g. the packed key state of one input sample.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    // --- Single Tag Operations ---
    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits & !tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    /// Add or remove `tag` depending on `on`.
    pub fn set<U: FlagBitmask<Storage = T>>(&mut self, tag: U, on: bool) {
        if on {
            self.add(tag);
        } else {
            self.remove(tag);
        }
    }

    // --- Bulk Operations ---
    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.add(tag);
        }
    }

    pub fn remove_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.remove(tag);
        }
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
///
/// Example:
/// ```rust
/// physics::define_bitmask_flags!(DoorState, u8, {
///     Open,
///     Locked,
/// });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_bitmask_flags!(Light, u16, { Red, Amber, Green });

    #[test]
    fn add_remove_and_query() {
        let mut flags = BitmaskFlags::<u16>::default();
        flags.add(Light::Red);
        flags.set(Light::Green, true);
        assert!(flags.has(Light::Red));
        assert!(!flags.has(Light::Amber));
        assert_eq!(flags.bits, 0b101);

        flags.set(Light::Red, false);
        assert_eq!(flags.bits, 0b100);
        flags.remove_many(&[Light::Amber, Light::Green]);
        assert_eq!(flags.bits, 0);
    }
}
