#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InitError {
    BadRequest,
    OutOfSpace,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AllocError {
    BadRequest,
    OOM,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HeapError {
    OOM,
}

impl From<HeapError> for InitError {
    fn from(error: HeapError) -> InitError {
        match error {
            HeapError::OOM => InitError::OutOfSpace,
        }
    }
}
