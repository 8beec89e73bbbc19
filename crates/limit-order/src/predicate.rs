//! Predicates gate whether an order can be filled.
//!
//! A predicate is a boolean expression tree. It travels in the predicate
//! segment of an order's extension in a compact binary form: every node
//! starts with a tag byte followed by its payload.
//!
//! ```text
//! and / or                 tag | count: u32 | count x end: u32 | children
//! not                      tag | child
//! eq / lt / gt             tag | value: 32 | target: 20 | calldata
//! timestamp below          tag | timestamp: u64
//! nonce equals             tag | maker: 20 | series: u64 | nonce: 32
//! timestamp below and      tag | timestamp: u64 | maker: 20 | series: u64 | nonce: 32
//!   nonce equals
//! arbitrary call           tag | target: 20 | calldata
//! ```
//!
//! Integers are big endian. The `end` offsets of `and` and `or` are
//! cumulative and relative to the first child byte.

use {
    crate::blockchain::{StaticContext, return_word},
    alloy_primitives::{Address, Bytes, U256},
};

/// Deepest nesting a decoded predicate may have.
pub const MAX_DEPTH: usize = 16;

const AND: u8 = 1;
const OR: u8 = 2;
const NOT: u8 = 3;
const EQ: u8 = 4;
const LT: u8 = 5;
const GT: u8 = 6;
const TIMESTAMP_BELOW: u8 = 7;
const NONCE_EQUALS: u8 = 8;
const TIMESTAMP_BELOW_AND_NONCE_EQUALS: u8 = 9;
const ARBITRARY_CALL: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Lt,
    Gt,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// True if all children are. Stops at the first false child.
    And(Vec<Predicate>),
    /// True if any child is. Stops at the first true child.
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    /// Compares the first word `target` returns for `data` against `value`,
    /// as in `returned < value` for [`Comparison::Lt`]. A failing call is
    /// false.
    Compare {
        op: Comparison,
        value: U256,
        target: Address,
        data: Bytes,
    },
    /// True while the block timestamp is below the given one.
    TimestampBelow(u64),
    /// True while the maker's series nonce equals the given one.
    NonceEquals {
        maker: Address,
        series: u64,
        nonce: U256,
    },
    TimestampBelowAndNonceEquals {
        timestamp: u64,
        maker: Address,
        series: u64,
        nonce: U256,
    },
    /// True if the call succeeds and returns the word 1.
    ArbitraryCall { target: Address, data: Bytes },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty predicate node")]
    Empty,
    #[error("unknown predicate tag {0}")]
    UnknownTag(u8),
    #[error("predicate node is truncated")]
    Truncated,
    #[error("predicate node has trailing bytes")]
    TrailingBytes,
    #[error("child offsets are out of order")]
    BadOffsets,
    #[error("predicate nests deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

impl Predicate {
    pub fn eq(value: U256, target: Address, data: impl Into<Bytes>) -> Self {
        Self::Compare {
            op: Comparison::Eq,
            value,
            target,
            data: data.into(),
        }
    }

    pub fn lt(value: U256, target: Address, data: impl Into<Bytes>) -> Self {
        Self::Compare {
            op: Comparison::Lt,
            value,
            target,
            data: data.into(),
        }
    }

    pub fn gt(value: U256, target: Address, data: impl Into<Bytes>) -> Self {
        Self::Compare {
            op: Comparison::Gt,
            value,
            target,
            data: data.into(),
        }
    }

    pub fn not(predicate: Predicate) -> Self {
        Self::Not(Box::new(predicate))
    }

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        decode_node(data, 1)
    }

    /// Binary form of the predicate. Nodes whose sizes do not fit the `u32`
    /// fields of the format encode to data that fails to decode.
    pub fn encode(&self) -> Bytes {
        let mut buffer = Vec::new();
        self.encode_into(&mut buffer);
        buffer.into()
    }

    fn encode_into(&self, buffer: &mut Vec<u8>) {
        match self {
            Self::And(children) | Self::Or(children) => {
                buffer.push(if matches!(self, Self::And(_)) { AND } else { OR });
                let encoded: Vec<Bytes> = children.iter().map(Predicate::encode).collect();
                buffer.extend_from_slice(&to_u32(encoded.len()).to_be_bytes());
                let mut end = 0usize;
                for child in &encoded {
                    end += child.len();
                    buffer.extend_from_slice(&to_u32(end).to_be_bytes());
                }
                for child in &encoded {
                    buffer.extend_from_slice(child);
                }
            }
            Self::Not(child) => {
                buffer.push(NOT);
                child.encode_into(buffer);
            }
            Self::Compare {
                op,
                value,
                target,
                data,
            } => {
                buffer.push(match op {
                    Comparison::Eq => EQ,
                    Comparison::Lt => LT,
                    Comparison::Gt => GT,
                });
                buffer.extend_from_slice(&value.to_be_bytes::<32>());
                buffer.extend_from_slice(target.as_slice());
                buffer.extend_from_slice(data);
            }
            Self::TimestampBelow(timestamp) => {
                buffer.push(TIMESTAMP_BELOW);
                buffer.extend_from_slice(&timestamp.to_be_bytes());
            }
            Self::NonceEquals {
                maker,
                series,
                nonce,
            } => {
                buffer.push(NONCE_EQUALS);
                encode_nonce(buffer, maker, *series, nonce);
            }
            Self::TimestampBelowAndNonceEquals {
                timestamp,
                maker,
                series,
                nonce,
            } => {
                buffer.push(TIMESTAMP_BELOW_AND_NONCE_EQUALS);
                buffer.extend_from_slice(&timestamp.to_be_bytes());
                encode_nonce(buffer, maker, *series, nonce);
            }
            Self::ArbitraryCall { target, data } => {
                buffer.push(ARBITRARY_CALL);
                buffer.extend_from_slice(target.as_slice());
                buffer.extend_from_slice(data);
            }
        }
    }

    pub fn evaluate(&self, context: &dyn StaticContext) -> bool {
        match self {
            Self::And(children) => children.iter().all(|child| child.evaluate(context)),
            Self::Or(children) => children.iter().any(|child| child.evaluate(context)),
            Self::Not(child) => !child.evaluate(context),
            Self::Compare {
                op,
                value,
                target,
                data,
            } => {
                let Some(returned) = call_for_word(context, *target, data) else {
                    return false;
                };
                match op {
                    Comparison::Eq => returned == *value,
                    Comparison::Lt => returned < *value,
                    Comparison::Gt => returned > *value,
                }
            }
            Self::TimestampBelow(timestamp) => context.timestamp() < *timestamp,
            Self::NonceEquals {
                maker,
                series,
                nonce,
            } => context.nonce(*maker, *series) == *nonce,
            Self::TimestampBelowAndNonceEquals {
                timestamp,
                maker,
                series,
                nonce,
            } => context.timestamp() < *timestamp && context.nonce(*maker, *series) == *nonce,
            Self::ArbitraryCall { target, data } => {
                call_for_word(context, *target, data) == Some(U256::from(1))
            }
        }
    }
}

/// Decodes and evaluates an encoded predicate.
pub fn check(data: &[u8], context: &dyn StaticContext) -> Result<bool, DecodeError> {
    Ok(Predicate::decode(data)?.evaluate(context))
}

fn call_for_word(context: &dyn StaticContext, target: Address, data: &Bytes) -> Option<U256> {
    match context.static_call(target, data.clone()) {
        Ok(returned) => return_word(&returned),
        Err(err) => {
            tracing::debug!(%target, %err, "predicate call failed");
            None
        }
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn encode_nonce(buffer: &mut Vec<u8>, maker: &Address, series: u64, nonce: &U256) {
    buffer.extend_from_slice(maker.as_slice());
    buffer.extend_from_slice(&series.to_be_bytes());
    buffer.extend_from_slice(&nonce.to_be_bytes::<32>());
}

/// Reads fixed size fields off the front of a node's payload.
struct Reader<'a>(&'a [u8]);

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.0.len() < len {
            return Err(DecodeError::Truncated);
        }
        let (head, tail) = self.0.split_at(len);
        self.0 = tail;
        Ok(head)
    }

    fn u32(&mut self) -> Result<usize, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
    }

    fn u64(&mut self) -> Result<u64, DecodeError> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(bytes))
    }

    fn word(&mut self) -> Result<U256, DecodeError> {
        Ok(U256::from_be_slice(self.take(32)?))
    }

    fn address(&mut self) -> Result<Address, DecodeError> {
        Ok(Address::from_slice(self.take(20)?))
    }

    fn rest(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.0)
    }

    fn finish(self) -> Result<(), DecodeError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes)
        }
    }
}

fn decode_node(data: &[u8], depth: usize) -> Result<Predicate, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::TooDeep);
    }
    let (&tag, payload) = data.split_first().ok_or(DecodeError::Empty)?;
    let mut reader = Reader(payload);
    let predicate = match tag {
        AND | OR => {
            let count = reader.u32()?;
            // Every child takes at least its tag byte and its end offset.
            if count > payload.len() {
                return Err(DecodeError::Truncated);
            }
            let ends = (0..count)
                .map(|_| reader.u32())
                .collect::<Result<Vec<_>, _>>()?;
            let children_data = reader.rest();
            let mut children = Vec::with_capacity(count);
            let mut begin = 0;
            for end in ends {
                if end < begin || end > children_data.len() {
                    return Err(DecodeError::BadOffsets);
                }
                children.push(decode_node(&children_data[begin..end], depth + 1)?);
                begin = end;
            }
            if begin != children_data.len() {
                return Err(DecodeError::TrailingBytes);
            }
            if tag == AND {
                Predicate::And(children)
            } else {
                Predicate::Or(children)
            }
        }
        NOT => Predicate::Not(Box::new(decode_node(reader.rest(), depth + 1)?)),
        EQ | LT | GT => Predicate::Compare {
            op: match tag {
                EQ => Comparison::Eq,
                LT => Comparison::Lt,
                _ => Comparison::Gt,
            },
            value: reader.word()?,
            target: reader.address()?,
            data: Bytes::copy_from_slice(reader.rest()),
        },
        TIMESTAMP_BELOW => Predicate::TimestampBelow(reader.u64()?),
        NONCE_EQUALS => Predicate::NonceEquals {
            maker: reader.address()?,
            series: reader.u64()?,
            nonce: reader.word()?,
        },
        TIMESTAMP_BELOW_AND_NONCE_EQUALS => Predicate::TimestampBelowAndNonceEquals {
            timestamp: reader.u64()?,
            maker: reader.address()?,
            series: reader.u64()?,
            nonce: reader.word()?,
        },
        ARBITRARY_CALL => Predicate::ArbitraryCall {
            target: reader.address()?,
            data: Bytes::copy_from_slice(reader.rest()),
        },
        tag => return Err(DecodeError::UnknownTag(tag)),
    };
    reader.finish()?;
    Ok(predicate)
}
