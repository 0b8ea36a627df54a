use super::{Alias, DistributionError};
use rand::Rng;

/// Picks one of a fixed set of items according to their weights.
#[derive(Debug, Clone)]
pub struct WeightedChoice<E> {
    alias: Alias,
    items: Vec<E>,
}

impl<E> WeightedChoice<E> {
    pub fn new<I>(weighted: I) -> Result<Self, DistributionError>
    where
        I: IntoIterator<Item = (E, f64)>,
    {
        let (items, weights): (Vec<E>, Vec<f64>) = weighted.into_iter().unzip();
        Ok(Self {
            alias: Alias::new(&weights)?,
            items,
        })
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &E {
        &self.items[self.alias.sample(rng)]
    }
}

impl<E: Clone> WeightedChoice<E> {
    pub fn choose_owned<R: Rng + ?Sized>(&self, rng: &mut R) -> E {
        self.choose(rng).clone()
    }
}
