//! Test fixtures for name resolution integration tests.
//!
//! A small Australian checklist in the JSON shape the in-memory indices
//! load: two genus homonyms named Macropus, a kangaroo species and its old
//! combination, a placeholder Acacia, and Acacia names carrying excluded and
//! misapplied usages.

/// Stable identifiers used by the tests.
pub mod lsid {
    pub const MACROPUS_ANIMAL: &str = "urn:lsid:biodiversity.org.au:afd.taxon:macropus";
    pub const MACROPUS_PLANT: &str = "urn:lsid:biodiversity.org.au:apni.taxon:macropus";
    pub const RED_KANGAROO: &str = "urn:lsid:biodiversity.org.au:afd.taxon:osphranter-rufus";
    pub const BUNGALBIN_HILL: &str = "urn:lsid:biodiversity.org.au:apni.taxon:acacia-bungalbin";
    pub const ACACIA_DECURRENS: &str = "urn:lsid:biodiversity.org.au:apni.taxon:acacia-decurrens";
    pub const ACACIA_MEARNSII: &str = "urn:lsid:biodiversity.org.au:apni.taxon:acacia-mearnsii";
    pub const ACACIA_PULCHELLA: &str = "urn:lsid:biodiversity.org.au:apni.taxon:acacia-pulchella";
}

/// Taxon concept records.
pub const TAXA_JSON: &str = r#"[
  {
    "id": "macropus-animal",
    "lsid": "urn:lsid:biodiversity.org.au:afd.taxon:macropus",
    "scientific_name": "Macropus",
    "authorship": "Shaw, 1790",
    "rank": "genus",
    "classification": {
      "kingdom": "Animalia", "phylum": "Chordata", "class": "Mammalia",
      "order": "Diprotodontia", "family": "Macropodidae", "genus": "Macropus"
    },
    "left": 100,
    "right": 120
  },
  {
    "id": "macropus-plant",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:macropus",
    "scientific_name": "Macropus",
    "authorship": "F.Muell.",
    "rank": "genus",
    "classification": {
      "kingdom": "Plantae", "phylum": "Charophyta", "class": "Equisetopsida",
      "order": "Fabales", "family": "Fabaceae", "genus": "Macropus"
    },
    "left": 500,
    "right": 501
  },
  {
    "id": "macropus-giganteus",
    "lsid": "urn:lsid:biodiversity.org.au:afd.taxon:macropus-giganteus",
    "scientific_name": "Macropus giganteus",
    "authorship": "Shaw, 1790",
    "rank": "species",
    "classification": {
      "kingdom": "Animalia", "phylum": "Chordata", "class": "Mammalia",
      "order": "Diprotodontia", "family": "Macropodidae", "genus": "Macropus",
      "species": "Macropus giganteus"
    },
    "left": 101,
    "right": 102
  },
  {
    "id": "osphranter-rufus",
    "lsid": "urn:lsid:biodiversity.org.au:afd.taxon:osphranter-rufus",
    "scientific_name": "Osphranter rufus",
    "authorship": "(Desmarest, 1822)",
    "rank": "species",
    "classification": {
      "kingdom": "Animalia", "phylum": "Chordata", "class": "Mammalia",
      "order": "Diprotodontia", "family": "Macropodidae", "genus": "Osphranter",
      "species": "Osphranter rufus"
    },
    "left": 130,
    "right": 131
  },
  {
    "id": "macropus-rufus",
    "lsid": "urn:lsid:biodiversity.org.au:afd.taxon:macropus-rufus",
    "accepted_lsid": "urn:lsid:biodiversity.org.au:afd.taxon:osphranter-rufus",
    "synonym_type": "subjective_synonym",
    "scientific_name": "Macropus rufus",
    "authorship": "(Desmarest, 1822)",
    "rank": "species",
    "classification": {
      "kingdom": "Animalia", "family": "Macropodidae", "genus": "Macropus"
    }
  },
  {
    "id": "acacia",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia",
    "scientific_name": "Acacia",
    "authorship": "Mill.",
    "rank": "genus",
    "classification": { "kingdom": "Plantae", "family": "Fabaceae", "genus": "Acacia" },
    "left": 600,
    "right": 700
  },
  {
    "id": "acacia-bungalbin",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-bungalbin",
    "scientific_name": "Acacia sp. Bungalbin Hill (B.J.Conn 3154) WA Herbarium",
    "rank": "species",
    "classification": { "kingdom": "Plantae", "family": "Fabaceae", "genus": "Acacia" },
    "phrase": { "phrase": "Bungalbin Hill", "voucher": "Conn3154" },
    "left": 601,
    "right": 602
  },
  {
    "id": "acacia-decurrens",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-decurrens",
    "scientific_name": "Acacia decurrens",
    "authorship": "Willd.",
    "rank": "species",
    "classification": { "kingdom": "Plantae", "family": "Fabaceae", "genus": "Acacia" },
    "left": 603,
    "right": 604
  },
  {
    "id": "acacia-mearnsii",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-mearnsii",
    "scientific_name": "Acacia mearnsii",
    "authorship": "De Wild.",
    "rank": "species",
    "classification": { "kingdom": "Plantae", "family": "Fabaceae", "genus": "Acacia" },
    "left": 605,
    "right": 606
  },
  {
    "id": "acacia-decurrens-misapplied",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-decurrens-misapplied",
    "accepted_lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-mearnsii",
    "synonym_type": "misapplied",
    "scientific_name": "Acacia decurrens",
    "rank": "species",
    "classification": { "kingdom": "Plantae", "family": "Fabaceae", "genus": "Acacia" }
  },
  {
    "id": "acacia-pulchella",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-pulchella",
    "scientific_name": "Acacia pulchella",
    "authorship": "R.Br.",
    "rank": "species",
    "classification": { "kingdom": "Plantae", "family": "Fabaceae", "genus": "Acacia" },
    "left": 607,
    "right": 608
  },
  {
    "id": "acacia-pulchella-excluded",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-pulchella-excluded",
    "accepted_lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-mearnsii",
    "synonym_type": "excludes",
    "scientific_name": "Acacia pulchella",
    "rank": "species",
    "classification": { "kingdom": "Plantae", "family": "Fabaceae", "genus": "Acacia" }
  },
  {
    "id": "acacia-exclusa",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-exclusa",
    "accepted_lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-mearnsii",
    "synonym_type": "excludes",
    "scientific_name": "Acacia exclusa",
    "rank": "species",
    "classification": { "kingdom": "Plantae", "family": "Fabaceae", "genus": "Acacia" }
  },
  {
    "id": "achillea",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:achillea",
    "scientific_name": "Achillea",
    "authorship": "L.",
    "rank": "genus",
    "classification": { "kingdom": "Plantae", "family": "Asteraceae", "genus": "Achillea" }
  }
]"#;

/// Genus classification paths of the homonym reference index.
pub const HOMONYMS_JSON: &str = r#"[
  {
    "rank": "genus",
    "classification": {
      "kingdom": "Animalia", "phylum": "Chordata", "class": "Mammalia",
      "order": "Diprotodontia", "family": "Macropodidae", "genus": "Macropus"
    }
  },
  {
    "rank": "genus",
    "classification": {
      "kingdom": "Plantae", "phylum": "Charophyta", "class": "Equisetopsida",
      "order": "Fabales", "family": "Fabaceae", "genus": "Macropus"
    }
  },
  {
    "rank": "genus",
    "classification": { "kingdom": "Plantae", "family": "Fabaceae", "genus": "Acacia" }
  }
]"#;

/// Common names.
pub const VERNACULAR_JSON: &str = r#"[
  {
    "common_name": "Red Kangaroo",
    "lsid": "urn:lsid:biodiversity.org.au:afd.taxon:osphranter-rufus",
    "scientific_name": "Osphranter rufus"
  },
  {
    "common_name": "Red Kangaroo",
    "lsid": "urn:lsid:biodiversity.org.au:afd.taxon:osphranter-rufus",
    "scientific_name": "Osphranter rufus (Desmarest, 1822)"
  },
  {
    "common_name": "Eastern Grey Kangaroo",
    "lsid": "urn:lsid:biodiversity.org.au:afd.taxon:macropus-giganteus",
    "scientific_name": "Macropus giganteus"
  },
  {
    "common_name": "Wattle",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-decurrens",
    "scientific_name": "Acacia decurrens"
  },
  {
    "common_name": "Wattle",
    "lsid": "urn:lsid:biodiversity.org.au:apni.taxon:acacia-mearnsii",
    "scientific_name": "Acacia mearnsii"
  }
]"#;

/// Names valid at more than one rank.
pub const CROSS_RANK_HOMONYMS: &str = "# genus and family level homonyms\nAchillea\n";
