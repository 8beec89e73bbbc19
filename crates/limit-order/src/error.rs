use {
    alloy_primitives::Bytes,
    model::extension,
    std::fmt::{self, Display, Formatter},
};

/// Data an external call reverted with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Revert(pub Bytes);

impl Display for Revert {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "reverted with {}", self.0)
    }
}

impl std::error::Error for Revert {}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way a protocol call can fail. A failing call leaves no trace in the
/// ledger or on the host.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // Authentication.
    #[error("signature does not authenticate the maker")]
    BadSignature,

    // Order constraints.
    #[error("sender is not the order's allowed sender")]
    PrivateOrder,
    #[error("order expired")]
    OrderExpired,
    #[error("order predicate is not true")]
    PredicateIsNotTrue,
    #[error("maker's series epoch does not match the order")]
    WrongSeriesNonce,
    #[error("epoch checks need a remaining amount invalidator")]
    EpochManagerAndBitInvalidatorsAreIncompatible,

    // Invalidation.
    #[error("order has been invalidated")]
    InvalidatedOrder,
    #[error("order has no remaining amount")]
    RemainingAmountIsZero,
    #[error("order has never been filled or cancelled")]
    UnknownOrder,
    #[error("nonce can only be advanced by 1 to 255")]
    AdvanceNonceFailed,
    #[error("maker traits do not select the bit invalidator")]
    WrongInvalidator,

    // Amounts.
    #[error("order amounts cannot price a swap")]
    SwappingAmountTooLow,
    #[error("fill moves a zero amount")]
    ZeroFillAmount,
    #[error("exactly one of the making and taking amounts must be requested")]
    InvalidAmountRequest,
    #[error("order does not allow partial fills")]
    PartialFillNotAllowed,
    #[error("taking amount exceeds the requested amount")]
    TakingAmountExceeded,
    #[error("making amount exceeds the order amount")]
    MakingAmountExceeded,
    #[error("taking amount is above the taker's threshold")]
    TakingAmountTooHigh,
    #[error("making amount is below the taker's threshold")]
    MakingAmountTooLow,
    #[error("amount getter call failed")]
    GetAmountCallFailed,

    // Encoding.
    #[error("order declares an extension but none was supplied")]
    MissingOrderExtension,
    #[error("extension supplied for an order without one")]
    UnexpectedOrderExtension,
    #[error("extension does not match the order's commitment")]
    InvalidExtensionHash,
    #[error("extension is malformed")]
    IncorrectExtensionLength,
    #[error("taker args are shorter than their declared lengths")]
    MalformedArgs,
    #[error("predicate cannot be decoded: {0}")]
    MalformedPredicate(#[from] crate::predicate::DecodeError),

    // Transfers and calls.
    #[error("maker asset transfer failed")]
    TransferFromMakerToTakerFailed,
    #[error("taker asset transfer failed")]
    TransferFromTakerToMakerFailed,
    #[error("permit call failed")]
    PermitFailed,
    #[error("WETH unwrap failed")]
    UnwrapFailed,
    #[error("interaction call failed: {0}")]
    InteractionFailed(Revert),
    #[error("state changing call inside a read only call")]
    StaticCallViolation,
}

impl From<extension::Error> for Error {
    fn from(err: extension::Error) -> Self {
        match err {
            extension::Error::MissingOrderExtension => Self::MissingOrderExtension,
            extension::Error::UnexpectedOrderExtension => Self::UnexpectedOrderExtension,
            extension::Error::InvalidExtensionHash => Self::InvalidExtensionHash,
            extension::Error::IncorrectExtensionLength
            | extension::Error::OffsetsNotMonotonic => Self::IncorrectExtensionLength,
        }
    }
}
