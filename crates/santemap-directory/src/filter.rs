//! Facility search/filter engine.
//!
//! `apply_filters` reduces the catalog to the subset matching a free-text
//! search term and a four-category flag selection, preserving catalog
//! order. Each stage is a pure predicate; the whole function is
//! deterministic and never fails — empty or absent inputs always resolve
//! to "no constraint".
//!
//! Category semantics: a category where every flag is false (or, except
//! for the type category, every flag is true) applies no constraint. A
//! proper subset of true flags means "match any of these". The type
//! category is the one asymmetric case: while it is constrained, a
//! facility whose type field matches none of the recognized keywords is
//! dropped, and an all-false selection drops everything.

use santemap_schema::Facility;

/// Facility-type flags. Classification is by case-insensitive substring
/// on the free-text type field, not by enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeFilters {
    pub hopital: bool,
    pub clinique: bool,
    pub centre: bool,
}

/// Specialty flags, matched against specialty tags by keyword root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialtyFilters {
    pub generale: bool,
    pub pediatrie: bool,
    pub cardiologie: bool,
    pub gynecologie: bool,
    pub ophtalmologie: bool,
}

/// Service flags. Emergency and blood bank match facility booleans, not
/// service tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceFilters {
    pub urgences: bool,
    pub maternite: bool,
    pub vaccination: bool,
    pub banque_de_sang: bool,
}

/// Spoken-language flags, matched against language tags by keyword root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageFilters {
    pub francais: bool,
    pub anglais: bool,
    pub peul: bool,
    pub soussou: bool,
    pub malinke: bool,
}

macro_rules! category_impl {
    ($ty:ident, $n:literal, [$(($kw:literal, $name:literal, $field:ident)),+ $(,)?]) => {
        impl $ty {
            /// Ordered (keyword, flag) table driving the matching policy.
            pub fn entries(&self) -> [(&'static str, bool); $n] {
                [$(($kw, self.$field)),+]
            }

            pub fn all() -> Self {
                Self { $($field: true),+ }
            }

            pub fn none() -> Self {
                Self { $($field: false),+ }
            }

            pub fn all_true(&self) -> bool {
                self.entries().iter().all(|(_, on)| *on)
            }

            pub fn all_false(&self) -> bool {
                self.entries().iter().all(|(_, on)| !*on)
            }

            pub fn true_count(&self) -> usize {
                self.entries().iter().filter(|(_, on)| *on).count()
            }

            pub const LEN: usize = $n;

            /// Set a flag by its wire name. Returns false for unknown names.
            pub fn set(&mut self, name: &str, value: bool) -> bool {
                match name {
                    $($name => { self.$field = value; true })+
                    _ => false,
                }
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::all()
            }
        }
    };
}

category_impl!(TypeFilters, 3, [
    ("hôpital", "hopital", hopital),
    ("clinique", "clinique", clinique),
    ("centre", "centre", centre),
]);

category_impl!(SpecialtyFilters, 5, [
    ("générale", "generale", generale),
    ("pédiatr", "pediatrie", pediatrie),
    ("cardio", "cardiologie", cardiologie),
    ("gynéco", "gynecologie", gynecologie),
    ("ophtalmo", "ophtalmologie", ophtalmologie),
]);

category_impl!(ServiceFilters, 4, [
    ("urgence", "urgences", urgences),
    ("maternité", "maternite", maternite),
    ("vaccination", "vaccination", vaccination),
    ("banque de sang", "banque_de_sang", banque_de_sang),
]);

category_impl!(LanguageFilters, 5, [
    ("français", "francais", francais),
    ("anglais", "anglais", anglais),
    ("peul", "peul", peul),
    ("soussou", "soussou", soussou),
    ("malinké", "malinke", malinke),
]);

/// The full four-category selection. Defaults to fully unconstrained
/// (every flag true), the state a fresh UI session starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
    pub types: TypeFilters,
    pub specialties: SpecialtyFilters,
    pub services: ServiceFilters,
    pub languages: LanguageFilters,
}

/// Reduce `catalog` to the facilities matching `search_term` and
/// `filters`, in catalog order. Stages narrow sequentially:
/// text → type → specialty → service → language.
pub fn apply_filters(
    catalog: &[Facility],
    search_term: &str,
    filters: &FilterState,
) -> Vec<Facility> {
    let term = search_term.trim().to_lowercase();
    catalog
        .iter()
        .filter(|f| matches_search(f, &term))
        .filter(|f| matches_type(f, &filters.types))
        .filter(|f| matches_specialty(f, &filters.specialties))
        .filter(|f| matches_service(f, &filters.services))
        .filter(|f| matches_language(f, &filters.languages))
        .cloned()
        .collect()
}

fn matches_search(facility: &Facility, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    facility.name.to_lowercase().contains(term)
        || facility.facility_type.to_lowercase().contains(term)
        || facility
            .services
            .iter()
            .any(|s| s.to_lowercase().contains(term))
}

fn matches_type(facility: &Facility, types: &TypeFilters) -> bool {
    if types.all_true() {
        return true;
    }
    let field = facility.facility_type.to_lowercase();
    // Unrecognized type keywords fall through to false: such a facility
    // is dropped while this stage is constrained.
    types
        .entries()
        .iter()
        .any(|(keyword, on)| *on && field.contains(keyword))
}

fn matches_specialty(facility: &Facility, specialties: &SpecialtyFilters) -> bool {
    if specialties.all_false() || specialties.all_true() {
        return true;
    }
    facility.specialties.iter().any(|tag| {
        let tag = tag.to_lowercase();
        specialties
            .entries()
            .iter()
            .any(|(keyword, on)| *on && tag.contains(keyword))
    })
}

fn matches_service(facility: &Facility, services: &ServiceFilters) -> bool {
    if services.all_false() || services.all_true() {
        return true;
    }
    if services.urgences && facility.has_emergency {
        return true;
    }
    // Blood bank matches on the facility boolean, never on tag content.
    if services.banque_de_sang && facility.has_blood_bank {
        return true;
    }
    facility.services.iter().any(|tag| {
        let tag = tag.to_lowercase();
        (services.maternite && tag.contains("maternité"))
            || (services.vaccination && tag.contains("vaccination"))
    })
}

fn matches_language(facility: &Facility, languages: &LanguageFilters) -> bool {
    if languages.all_false() || languages.all_true() {
        return true;
    }
    facility.languages.iter().any(|tag| {
        let tag = tag.to_lowercase();
        languages
            .entries()
            .iter()
            .any(|(keyword, on)| *on && tag.contains(keyword))
    })
}

/// Count shown on the UI filter badge: the sum of true flags across all
/// categories, with every fully-true category collapsed to a single
/// contribution. Clamped at zero.
pub fn active_filter_count(filters: &FilterState) -> usize {
    let mut raw: i64 = 0;
    let mut collapse: i64 = 0;

    let categories: [(usize, usize, bool); 4] = [
        (
            filters.types.true_count(),
            TypeFilters::LEN,
            filters.types.all_true(),
        ),
        (
            filters.specialties.true_count(),
            SpecialtyFilters::LEN,
            filters.specialties.all_true(),
        ),
        (
            filters.services.true_count(),
            ServiceFilters::LEN,
            filters.services.all_true(),
        ),
        (
            filters.languages.true_count(),
            LanguageFilters::LEN,
            filters.languages.all_true(),
        ),
    ];

    for (true_count, len, all_true) in categories {
        raw += true_count as i64;
        if all_true {
            collapse += len as i64 - 1;
        }
    }

    (raw - collapse).max(0) as usize
}
