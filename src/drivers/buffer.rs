use crate::drivers::{MonitorError, SampleChunk};
/// Holds the current chunk only; every push replaces the previous one.
pub struct ChunkBuffer {
    chunk_size: usize,
    current: Option<SampleChunk>,
    chunks_seen: u64,
}
impl ChunkBuffer {
    pub fn new(chunk_size: usize) -> Result<Self, MonitorError> {
        if chunk_size == 0 {
            return Err(MonitorError::InvalidConfig(
                "chunk size must be greater than zero".into(),
            ));
        }
        Ok(Self {
            chunk_size,
            current: None,
            chunks_seen: 0,
        })
    }
    pub fn chunks_seen(&self) -> u64 {
        self.chunks_seen
    }
    pub fn replace(&mut self, chunk: SampleChunk) -> Result<&SampleChunk, MonitorError> {
        chunk.validate(self.chunk_size)?;
        self.chunks_seen += 1;
        Ok(&*self.current.insert(chunk))
    }
    pub fn current(&self) -> Option<&SampleChunk> {
        self.current.as_ref()
    }
    pub fn clear(&mut self) {
        self.current = None;
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn replace_overwrites_previous_chunk() {
        let mut buffer = ChunkBuffer::new(3).unwrap();
        buffer.replace(SampleChunk::new(10, vec![1, 2, 3])).unwrap();
        buffer.replace(SampleChunk::new(10, vec![4, 5, 6])).unwrap();
        assert_eq!(buffer.current().unwrap().samples, vec![4, 5, 6]);
        assert_eq!(buffer.chunks_seen(), 2);
    }
    #[test]
    fn wrong_length_is_rejected_and_keeps_old_chunk() {
        let mut buffer = ChunkBuffer::new(3).unwrap();
        buffer.replace(SampleChunk::new(10, vec![1, 2, 3])).unwrap();
        assert!(buffer.replace(SampleChunk::new(10, vec![9; 4])).is_err());
        assert_eq!(buffer.current().unwrap().samples, vec![1, 2, 3]);
        assert_eq!(buffer.chunks_seen(), 1);
    }
    #[test]
    fn zero_chunk_size_is_invalid() {
        assert!(matches!(
            ChunkBuffer::new(0),
            Err(MonitorError::InvalidConfig(_))
        ));
    }
}
