use {
    crate::{Error, Result},
    alloy_primitives::{Address, Bytes},
    model::traits::TakerTraits,
};

const ADDRESS_LEN: usize = 20;

/// The taker supplied tail of a fill call: an optional recipient of the
/// maker asset, the order's extension and a taker interaction, in that order.
/// Their presence and lengths are declared in the taker traits. Bytes past
/// the declared parts are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TakerArgs<'a> {
    pub target: Option<Address>,
    pub extension: &'a [u8],
    pub interaction: &'a [u8],
}

impl<'a> TakerArgs<'a> {
    pub fn parse(taker_traits: &TakerTraits, args: &'a [u8]) -> Result<Self> {
        let mut rest = args;
        let target = if taker_traits.args_has_target {
            let (target, tail) = split(rest, ADDRESS_LEN)?;
            rest = tail;
            Some(Address::from_slice(target))
        } else {
            None
        };
        let (extension, rest) = split(rest, taker_traits.args_extension_length as usize)?;
        let (interaction, _) = split(rest, taker_traits.args_interaction_length as usize)?;
        Ok(Self {
            target,
            extension,
            interaction,
        })
    }

    /// Encodes the args and declares them in `taker_traits`.
    pub fn encode(&self, mut taker_traits: TakerTraits) -> (TakerTraits, Bytes) {
        let length = |part: &[u8]| u32::try_from(part.len()).unwrap_or(u32::MAX);
        taker_traits.args_has_target = self.target.is_some();
        taker_traits.args_extension_length = length(self.extension);
        taker_traits.args_interaction_length = length(self.interaction);

        let target = self
            .target
            .as_ref()
            .map(|target| target.as_slice())
            .unwrap_or_default();
        let args = [target, self.extension, self.interaction].concat();
        (taker_traits, args.into())
    }
}

fn split(data: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
    if data.len() < len {
        return Err(Error::MalformedArgs);
    }
    Ok(data.split_at(len))
}
