macro_rules! verify {
    ($condition: expr, $result: expr) => {
        if !$condition {
            return Err(crate::BlockOperationError::invalid($result));
        }
    };
}
