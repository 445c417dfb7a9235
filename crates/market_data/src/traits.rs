/// Converts a decoded exchange payload into the value the rest of the
/// system works with.
pub trait RemoteResponse<T> {
    type Error;

    fn to_model(&self) -> Result<T, Self::Error>;
}
