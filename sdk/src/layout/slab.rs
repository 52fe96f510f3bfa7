//! Order-book slab layout.
//!
//! Each side of the book is a crit-bit tree stored as an array of 72-byte
//! nodes. Leaf keys are `u128` values whose upper 64 bits are the price in
//! lots, so an in-order walk yields orders by ascending price.

use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;

use super::{AccountFlags, HEAD_PADDING};
use crate::error::SdkError;

/// Offset of the slab header.
const SLAB_HEADER_OFFSET: usize = HEAD_PADDING + 8;

/// Offset of the first node.
const SLAB_NODES_OFFSET: usize = SLAB_HEADER_OFFSET + 32;

/// Width of a slab node.
pub const SLAB_NODE_SIZE: usize = 72;

const TAG_INNER: u32 = 1;
const TAG_LEAF: u32 = 2;

#[derive(Debug, BorshDeserialize)]
#[cfg_attr(test, derive(borsh::BorshSerialize))]
#[allow(dead_code)] // Padding and unused fields keep the on-chain byte layout
pub(crate) struct RawSlabHeader {
    pub(crate) bump_index: u32,
    pub(crate) padding0: u32,
    pub(crate) free_list_len: u32,
    pub(crate) padding1: u32,
    pub(crate) free_list_head: u32,
    pub(crate) root: u32,
    pub(crate) leaf_count: u32,
    pub(crate) padding2: u32,
}

#[derive(Debug, BorshDeserialize)]
#[cfg_attr(test, derive(borsh::BorshSerialize))]
#[allow(dead_code)] // Padding and unused fields keep the on-chain byte layout
pub(crate) struct RawInnerNode {
    pub(crate) prefix_len: u32,
    pub(crate) key: u128,
    pub(crate) children: [u32; 2],
}

#[derive(Debug, BorshDeserialize)]
#[cfg_attr(test, derive(borsh::BorshSerialize))]
#[allow(dead_code)] // Padding and unused fields keep the on-chain byte layout
pub(crate) struct RawLeafNode {
    pub(crate) owner_slot: u8,
    pub(crate) fee_tier: u8,
    pub(crate) padding: [u8; 2],
    pub(crate) key: u128,
    pub(crate) owner: [u8; 32],
    pub(crate) quantity: u64,
    pub(crate) client_order_id: u64,
}

/// A resting order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    /// Slot of the order inside its open-orders account.
    pub owner_slot: u8,
    /// Fee tier of the owner.
    pub fee_tier: u8,
    /// Order key: price in lots (high 64 bits) and sequence number.
    pub key: u128,
    /// Open-orders account that placed the order.
    pub owner: Pubkey,
    /// Remaining quantity in base lots.
    pub quantity: u64,
    /// Client-assigned order id.
    pub client_order_id: u64,
}

impl LeafNode {
    /// Builds an order key from a price and a sequence number.
    #[must_use]
    pub const fn key_for(price_lots: u64, sequence: u64) -> u128 {
        ((price_lots as u128) << 64) | sequence as u128
    }

    /// Price in quote lots per base lot.
    #[must_use]
    pub const fn price_lots(&self) -> u64 {
        (self.key >> 64) as u64
    }
}

impl From<RawLeafNode> for LeafNode {
    fn from(raw: RawLeafNode) -> Self {
        Self {
            owner_slot: raw.owner_slot,
            fee_tier: raw.fee_tier,
            key: raw.key,
            owner: Pubkey::new_from_array(raw.owner),
            quantity: raw.quantity,
            client_order_id: raw.client_order_id,
        }
    }
}

enum SlabNode {
    Inner([u32; 2]),
    Leaf(LeafNode),
    Unused(u32),
}

fn read_node(data: &[u8], index: u32) -> Result<SlabNode, SdkError> {
    let start = SLAB_NODES_OFFSET + index as usize * SLAB_NODE_SIZE;
    let mut bytes = data
        .get(start..start + SLAB_NODE_SIZE)
        .ok_or_else(|| SdkError::invalid_account("slab", format!("node {} out of bounds", index)))?;

    let tag = u32::deserialize(&mut bytes)?;
    match tag {
        TAG_INNER => Ok(SlabNode::Inner(RawInnerNode::deserialize(&mut bytes)?.children)),
        TAG_LEAF => Ok(SlabNode::Leaf(RawLeafNode::deserialize(&mut bytes)?.into())),
        other => Ok(SlabNode::Unused(other)),
    }
}

/// Walks the tree from the root and returns the leaves by ascending key.
fn leaves_ascending(data: &[u8], header: &RawSlabHeader) -> Result<Vec<LeafNode>, SdkError> {
    if header.leaf_count == 0 {
        return Ok(Vec::new());
    }

    let mut leaves = Vec::with_capacity(header.leaf_count as usize);
    let mut stack = vec![header.root];
    let mut visited = 0usize;

    while let Some(index) = stack.pop() {
        visited += 1;
        if visited > header.bump_index as usize {
            return Err(SdkError::invalid_account("slab", "tree contains a cycle"));
        }

        match read_node(data, index)? {
            SlabNode::Inner([left, right]) => {
                stack.push(right);
                stack.push(left);
            }
            SlabNode::Leaf(leaf) => leaves.push(leaf),
            SlabNode::Unused(tag) => {
                return Err(SdkError::invalid_account(
                    "slab",
                    format!("node {} with tag {} reachable from root", index, tag),
                ));
            }
        }
    }

    Ok(leaves)
}

/// Aggregated price level in lots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotLevel {
    /// Price in quote lots per base lot.
    pub price_lots: u64,
    /// Summed quantity in base lots.
    pub size_lots: u64,
}

/// One decoded side of a market's order book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orderbook {
    is_bids: bool,
    /// Orders, best price first.
    orders: Vec<LeafNode>,
}

impl Orderbook {
    /// Decodes a bids or asks slab account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not an initialized slab or the
    /// tree is malformed.
    pub fn decode(data: &[u8]) -> Result<Self, SdkError> {
        let mut head = data
            .get(HEAD_PADDING..SLAB_NODES_OFFSET)
            .ok_or_else(|| SdkError::invalid_account("slab", "account too short"))?;

        let flags = AccountFlags::new(u64::deserialize(&mut head)?);
        let is_bids = if flags.contains(AccountFlags::INITIALIZED | AccountFlags::BIDS) {
            true
        } else if flags.contains(AccountFlags::INITIALIZED | AccountFlags::ASKS) {
            false
        } else {
            return Err(SdkError::invalid_account(
                "slab",
                format!("unexpected account flags {:#x}", flags.bits()),
            ));
        };

        let header = RawSlabHeader::deserialize(&mut head)?;
        let orders = leaves_ascending(data, &header)?;

        Ok(Self::from_orders(is_bids, orders))
    }

    /// Builds a book side from orders in any order.
    #[must_use]
    pub fn from_orders(is_bids: bool, mut orders: Vec<LeafNode>) -> Self {
        orders.sort_by_key(|order| order.key);
        if is_bids {
            orders.reverse();
        }
        Self { is_bids, orders }
    }

    /// Returns true if this is the bids side.
    #[must_use]
    pub const fn is_bids(&self) -> bool {
        self.is_bids
    }

    /// Orders, best price first.
    #[must_use]
    pub fn orders(&self) -> &[LeafNode] {
        &self.orders
    }

    /// Best resting order.
    #[must_use]
    pub fn best(&self) -> Option<&LeafNode> {
        self.orders.first()
    }

    /// Aggregates orders into at most `depth` price levels, best first.
    #[must_use]
    pub fn l2(&self, depth: usize) -> Vec<LotLevel> {
        let mut levels: Vec<LotLevel> = Vec::new();

        for order in &self.orders {
            let price_lots = order.price_lots();
            match levels.last_mut() {
                Some(level) if level.price_lots == price_lots => {
                    level.size_lots = level.size_lots.saturating_add(order.quantity);
                }
                _ => {
                    if levels.len() == depth {
                        break;
                    }
                    levels.push(LotLevel {
                        price_lots,
                        size_lots: order.quantity,
                    });
                }
            }
        }

        levels
    }
}
