//! Solidity ABI of the signed order structs and of every external interface
//! the protocol calls into or exposes to hooks.

use alloy_sol_types::sol;

sol! {
    /// EIP-712 typed struct of a standard order. The order's extension is
    /// not part of it; it is committed to through the salt.
    #[derive(Debug, PartialEq, Eq)]
    struct Order {
        uint256 salt;
        address maker;
        address receiver;
        address makerAsset;
        address takerAsset;
        uint256 makingAmount;
        uint256 takingAmount;
        uint256 makerTraits;
    }

    /// EIP-712 typed struct of a fill-once RFQ order.
    #[derive(Debug, PartialEq, Eq)]
    struct OrderRFQ {
        uint256 salt;
        address maker;
        address receiver;
        address allowedSender;
        address makerAsset;
        address takerAsset;
        uint256 makingAmount;
        uint256 takingAmount;
        uint256 makerTraits;
    }

    interface IERC20 {
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function permit(address owner, address spender, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external;
    }

    interface IWETH {
        function withdraw(uint256 amount) external;
    }

    interface IPermit2 {
        function transferFrom(address from, address to, uint160 amount, address token) external;
    }

    interface IERC1271 {
        function isValidSignature(bytes32 hash, bytes signature) external view returns (bytes4 magicValue);
    }

    interface IPreInteraction {
        function preInteraction(
            Order order,
            bytes extension,
            bytes32 orderHash,
            address taker,
            uint256 makingAmount,
            uint256 takingAmount,
            uint256 remainingMakingAmount,
            bytes extraData
        ) external;
    }

    interface IPostInteraction {
        function postInteraction(
            Order order,
            bytes extension,
            bytes32 orderHash,
            address taker,
            uint256 makingAmount,
            uint256 takingAmount,
            uint256 remainingMakingAmount,
            bytes extraData
        ) external;
    }

    interface ITakerInteraction {
        function takerInteraction(
            Order order,
            bytes extension,
            bytes32 orderHash,
            address taker,
            uint256 makingAmount,
            uint256 takingAmount,
            uint256 remainingMakingAmount,
            bytes extraData
        ) external;
    }

    /// Dutch auction pricing: the taking amount decays linearly from
    /// `takingAmountStart` to `takingAmountEnd` between the two timestamps
    /// packed into `startTimeEndTime` (start in the high 128 bits).
    interface IDutchAuctionCalculator {
        function getMakingAmount(
            uint256 startTimeEndTime,
            uint256 takingAmountStart,
            uint256 takingAmountEnd,
            uint256 makingAmount,
            uint256 requestedTakingAmount
        ) external view returns (uint256);

        function getTakingAmount(
            uint256 startTimeEndTime,
            uint256 takingAmountStart,
            uint256 takingAmountEnd,
            uint256 makingAmount,
            uint256 requestedMakingAmount
        ) external view returns (uint256);
    }
}

/// The value an EIP-1271 contract returns from `isValidSignature` for a
/// signature it accepts.
pub const EIP1271_MAGIC_VALUE: [u8; 4] = hex_literal::hex!("1626ba7e");
