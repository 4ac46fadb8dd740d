use std::fmt::Debug;
use std::hash::Hash;

/// A fixed width unit all codecs are generic over. Only equality and ordering matter to the
/// transforms; the width and the u32 conversions are used by the wire format and by the
/// pipelines when a structured record is flattened back into symbols.
pub trait Symbol: Copy + Ord + Hash + Default + Debug + Send + Sync + 'static {
    /// Width in bytes.
    const WIDTH: usize;

    /// Lossless widening.
    fn to_u32(self) -> u32;

    /// Narrowing, keeping the low WIDTH bytes.
    fn from_u32(value: u32) -> Self;

    /// Narrowing that refuses values the width cannot hold.
    fn try_from_u32(value: u32) -> Option<Self> {
        let symbol = Self::from_u32(value);
        (symbol.to_u32() == value).then(|| symbol)
    }

    fn to_le_bytes(self, out: &mut Vec<u8>);

    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_symbol {
    ($t:ty) => {
        impl Symbol for $t {
            const WIDTH: usize = std::mem::size_of::<$t>();

            #[inline]
            fn to_u32(self) -> u32 {
                self as u32
            }

            #[inline]
            fn from_u32(value: u32) -> Self {
                value as $t
            }

            fn to_le_bytes(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&<$t>::to_le_bytes(self));
            }

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut raw = [0_u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(&bytes[..std::mem::size_of::<$t>()]);
                <$t>::from_le_bytes(raw)
            }
        }
    };
}

impl_symbol!(u8);
impl_symbol!(u16);
impl_symbol!(u32);
