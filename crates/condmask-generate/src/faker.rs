use condmask_rules::MaskingCategory;
use fake::Fake;
use fake::faker::address::raw::{
    BuildingNumber, CityName, CountryName, StateAbbr, StreetName, ZipCode,
};
use fake::faker::company::raw::CompanyName;
use fake::faker::impls::address::CityNameGenFn;
use fake::faker::internet::raw::{FreeEmail, Password};
use fake::faker::lorem::raw::Sentences;
use fake::faker::name::raw::Name;
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::{Data, EN, PT_BR};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::errors::GenerationError;
use crate::generator::ValueGenerator;
use crate::locales::LocaleKey;
use crate::semantic;

/// Faker-backed generator. Unseeded instances draw a fresh seed from the
/// thread RNG, so every run produces different values.
#[derive(Debug, Clone)]
pub struct FakerGenerator<R = ChaCha8Rng> {
    locale: LocaleKey,
    rng: R,
}

impl FakerGenerator<ChaCha8Rng> {
    pub fn new(locale: LocaleKey) -> Self {
        Self::with_rng(locale, ChaCha8Rng::from_rng(&mut rand::rng()))
    }

    /// Reproducible generator: the same seed and locale yield the same
    /// sequence of values.
    pub fn seeded(locale: LocaleKey, seed: u64) -> Self {
        Self::with_rng(locale, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> FakerGenerator<R> {
    pub fn with_rng(locale: LocaleKey, rng: R) -> Self {
        Self { locale, rng }
    }

    pub fn locale(&self) -> LocaleKey {
        self.locale
    }
}

impl<R: Rng> ValueGenerator for FakerGenerator<R> {
    fn generate(&mut self, category: &MaskingCategory) -> Result<String, GenerationError> {
        match self.locale {
            LocaleKey::EnUs => draw(EN, self.locale, category, &mut self.rng),
            LocaleKey::PtBr => draw(PT_BR, self.locale, category, &mut self.rng),
        }
    }
}

fn draw<L, R>(
    data: L,
    locale: LocaleKey,
    category: &MaskingCategory,
    rng: &mut R,
) -> Result<String, GenerationError>
where
    L: Data + CityNameGenFn + Copy,
    R: Rng + ?Sized,
{
    let value: String = match category {
        MaskingCategory::Name => Name(data).fake_with_rng(rng),
        MaskingCategory::Email => FreeEmail(data).fake_with_rng(rng),
        MaskingCategory::Address => address(data, locale, rng),
        MaskingCategory::PhoneNumber => PhoneNumber(data).fake_with_rng(rng),
        MaskingCategory::Company => CompanyName(data).fake_with_rng(rng),
        MaskingCategory::Ssn => match locale {
            LocaleKey::EnUs => semantic::ssn_us(rng),
            LocaleKey::PtBr => semantic::cpf(rng),
        },
        MaskingCategory::Date => semantic::date(rng)?,
        MaskingCategory::City => CityName(data).fake_with_rng(rng),
        MaskingCategory::Country => CountryName(data).fake_with_rng(rng),
        MaskingCategory::Text => {
            let sentences: Vec<String> = Sentences(data, 2..5).fake_with_rng(rng);
            sentences.join(" ")
        }
        MaskingCategory::Password => Password(data, 8..17).fake_with_rng(rng),
        MaskingCategory::Unknown(tag) => {
            return Err(GenerationError::UnknownCategory(tag.clone()));
        }
    };
    Ok(value)
}

fn address<L, R>(data: L, locale: LocaleKey, rng: &mut R) -> String
where
    L: Data + CityNameGenFn + Copy,
    R: Rng + ?Sized,
{
    let number: String = BuildingNumber(data).fake_with_rng(rng);
    let street: String = StreetName(data).fake_with_rng(rng);
    let city: String = CityName(data).fake_with_rng(rng);
    let state: String = StateAbbr(data).fake_with_rng(rng);
    let zip: String = ZipCode(data).fake_with_rng(rng);
    match locale {
        LocaleKey::EnUs => format!("{number} {street}\n{city}, {state} {zip}"),
        LocaleKey::PtBr => format!("{street}, {number}\n{city} - {state}, {zip}"),
    }
}
