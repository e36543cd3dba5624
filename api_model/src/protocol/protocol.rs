use crate::err::Result;

pub trait Protocol {
    /// Serialize this value into a vector of bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Construct an instance from a slice of bytes.
    fn deserialize(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized;
}
