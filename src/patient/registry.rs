//! Typed organ registry.
//!
//! One optional slot per organ kind gives constant-time presence checks and
//! typed access without inspecting trait objects at runtime.

use crate::dynamics::NoiseSource;
use crate::organs::{
    Bladder, Brain, Esophagus, Gallbladder, Heart, Intestines, Kidneys, Liver, Lungs, Organ,
    OrganKind, Pancreas, SpinalCord, Spleen, Stomach,
};
use crate::state::Blood;

/// Organ type stored in a dedicated [`OrganSet`] slot
pub trait RegisteredOrgan: Organ + Sized {
    const KIND: OrganKind;

    fn slot(set: &OrganSet) -> &Option<Self>;

    fn slot_mut(set: &mut OrganSet) -> &mut Option<Self>;
}

macro_rules! organ_slots {
    ($($kind:ident => $field:ident: $ty:ty),* $(,)?) => {
        /// At most one organ of each kind
        #[derive(Debug, Clone, Default)]
        pub struct OrganSet {
            $($field: Option<$ty>,)*
        }

        $(
            impl RegisteredOrgan for $ty {
                const KIND: OrganKind = OrganKind::$kind;

                fn slot(set: &OrganSet) -> &Option<Self> {
                    &set.$field
                }

                fn slot_mut(set: &mut OrganSet) -> &mut Option<Self> {
                    &mut set.$field
                }
            }
        )*

        impl OrganSet {
            /// Organ of the given kind as a trait object
            pub fn get(&self, kind: OrganKind) -> Option<&dyn Organ> {
                match kind {
                    $(OrganKind::$kind => self.$field.as_ref().map(|organ| organ as &dyn Organ),)*
                }
            }

            /// Drop the organ of the given kind; returns whether one was present
            pub fn remove(&mut self, kind: OrganKind) -> bool {
                match kind {
                    $(OrganKind::$kind => self.$field.take().is_some(),)*
                }
            }
        }
    };
}

organ_slots! {
    Heart => heart: Heart,
    Lungs => lungs: Lungs,
    Brain => brain: Brain,
    Liver => liver: Liver,
    Kidneys => kidneys: Kidneys,
    Bladder => bladder: Bladder,
    Stomach => stomach: Stomach,
    Intestines => intestines: Intestines,
    Gallbladder => gallbladder: Gallbladder,
    Pancreas => pancreas: Pancreas,
    Esophagus => esophagus: Esophagus,
    Spleen => spleen: Spleen,
    SpinalCord => spinal_cord: SpinalCord,
}

impl OrganSet {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `organ` in its slot, returning any organ it replaced
    pub fn insert<T: RegisteredOrgan>(&mut self, organ: T) -> Option<T> {
        T::slot_mut(self).replace(organ)
    }

    pub fn organ<T: RegisteredOrgan>(&self) -> Option<&T> {
        T::slot(self).as_ref()
    }

    pub fn organ_mut<T: RegisteredOrgan>(&mut self) -> Option<&mut T> {
        T::slot_mut(self).as_mut()
    }

    pub fn contains(&self, kind: OrganKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn len(&self) -> usize {
        OrganKind::ALL.iter().filter(|&&kind| self.contains(kind)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present organs in registration order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Organ> + '_ {
        OrganKind::ALL.iter().filter_map(move |&kind| self.get(kind))
    }

    /// Advance the organ of `kind` by one tick, wiring in its collaborators.
    ///
    /// A missing organ is skipped; a missing collaborator is passed as `None`.
    pub(crate) fn advance(
        &mut self,
        kind: OrganKind,
        blood: &mut Blood,
        noise: &mut NoiseSource,
        dt_sec: f64,
    ) {
        match kind {
            OrganKind::Spleen => {
                if let Some(spleen) = self.spleen.as_mut() {
                    spleen.update(noise, dt_sec);
                }
            }
            OrganKind::SpinalCord => {
                if let Some(spinal_cord) = self.spinal_cord.as_mut() {
                    spinal_cord.update(noise, dt_sec);
                }
            }
            OrganKind::Liver => {
                if let Some(liver) = self.liver.as_mut() {
                    liver.update(blood, noise, dt_sec);
                }
            }
            OrganKind::Gallbladder => {
                if let Some(gallbladder) = self.gallbladder.as_mut() {
                    gallbladder.update(dt_sec, self.liver.as_ref());
                }
            }
            OrganKind::Pancreas => {
                if let Some(pancreas) = self.pancreas.as_mut() {
                    pancreas.update(blood, noise, dt_sec);
                }
            }
            OrganKind::Esophagus => {
                if let Some(esophagus) = self.esophagus.as_mut() {
                    esophagus.update(noise, dt_sec, self.stomach.as_mut());
                }
            }
            OrganKind::Stomach => {
                if let Some(stomach) = self.stomach.as_mut() {
                    stomach.update(dt_sec, self.intestines.as_mut());
                }
            }
            OrganKind::Intestines => {
                if let Some(intestines) = self.intestines.as_mut() {
                    intestines.update(
                        blood,
                        noise,
                        dt_sec,
                        self.gallbladder.as_mut(),
                        self.pancreas.as_mut(),
                    );
                }
            }
            OrganKind::Kidneys => {
                if let Some(kidneys) = self.kidneys.as_mut() {
                    kidneys.update(
                        blood,
                        noise,
                        dt_sec,
                        self.heart.as_ref(),
                        self.liver.as_ref(),
                        self.bladder.as_mut(),
                    );
                }
            }
            OrganKind::Bladder => {
                if let Some(bladder) = self.bladder.as_mut() {
                    bladder.update(dt_sec);
                }
            }
            OrganKind::Heart => {
                if let Some(heart) = self.heart.as_mut() {
                    heart.update(blood, noise, dt_sec);
                }
            }
            OrganKind::Lungs => {
                if let Some(lungs) = self.lungs.as_mut() {
                    lungs.update(blood, noise, dt_sec);
                }
            }
            OrganKind::Brain => {
                if let Some(brain) = self.brain.as_mut() {
                    brain.update(
                        blood,
                        noise,
                        dt_sec,
                        self.heart.as_mut(),
                        self.lungs.as_mut(),
                        self.spinal_cord.as_ref(),
                    );
                }
            }
        }
    }
}
