//! The coverage entity and the row-level primitives of the record store.
//!
//! Every string attribute is nullable in storage; completeness and length are
//! enforced when a [`CoverageFields`] set is turned into a row.
use std::collections::BTreeMap;

use sea_orm::{
    entity::prelude::*,
    sea_query::{Alias, BinOper, Expr, Func, Table},
    ConnectionTrait, DatabaseConnection, PaginatorTrait, QueryFilter, QueryOrder, Schema,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::ModelError;

pub const TABLE_NAME: &str = "SERVICECOVERAGES";
/// Upper bound for every string attribute.
pub const MAX_FIELD_LEN: usize = 255;
/// Upper bound for a single listing page.
pub const MAX_PER_PAGE: u64 = 255;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "SERVICECOVERAGES")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "CID")]
    pub cid: i32,
    #[sea_orm(column_name = "PARTNAME")]
    pub shortname: Option<String>,
    #[sea_orm(column_name = "GBG")]
    pub gbg: Option<String>,
    #[sea_orm(column_name = "CROSSTPS")]
    pub crosstps: Option<String>,
    #[sea_orm(column_name = "CROSSTPSMGR")]
    pub crosstpsm: Option<String>,
    #[sea_orm(column_name = "MGEXEC")]
    pub mgexec: Option<String>,
    #[sea_orm(column_name = "MGEXECMGR")]
    pub mgexecm: Option<String>,
    #[sea_orm(column_name = "SILABLEAD")]
    pub silablead: Option<String>,
    #[sea_orm(column_name = "SILABLEADMGR")]
    pub silableadm: Option<String>,
    #[sea_orm(column_name = "SOLARCH")]
    pub solarch: Option<String>,
    #[sea_orm(column_name = "SOLARCHMGR")]
    pub solarchm: Option<String>,
    #[sea_orm(column_name = "BPSDAA")]
    pub bpsdaa: Option<String>,
    #[sea_orm(column_name = "BPSDAAMGR")]
    pub bpsdaam: Option<String>,
    #[sea_orm(column_name = "BPSSEC")]
    pub bpssec: Option<String>,
    #[sea_orm(column_name = "BPSSECMGR")]
    pub bpssecm: Option<String>,
    #[sea_orm(column_name = "BPSSUS")]
    pub bpssus: Option<String>,
    #[sea_orm(column_name = "BPSSUSMGR")]
    pub bpssusm: Option<String>,
    #[sea_orm(column_name = "BPSZ")]
    pub bpsz: Option<String>,
    #[sea_orm(column_name = "BPSZMGR")]
    pub bpszm: Option<String>,
    #[sea_orm(column_name = "BPSPOW")]
    pub bpspow: Option<String>,
    #[sea_orm(column_name = "BPSPOWMGR")]
    pub bpspowm: Option<String>,
    #[sea_orm(column_name = "BPSSTOR")]
    pub bpsstor: Option<String>,
    #[sea_orm(column_name = "BPSSTORMGR")]
    pub bpsstorm: Option<String>,
    #[sea_orm(column_name = "BPSCLOUD")]
    pub bpscloud: Option<String>,
    #[sea_orm(column_name = "BPSCLOUDMGR")]
    pub bpscloudm: Option<String>,
    #[sea_orm(column_name = "CROSSPTS")]
    pub crosspts: Option<String>,
    #[sea_orm(column_name = "CROSSPTSMGR")]
    pub crossptsm: Option<String>,
    #[sea_orm(column_name = "PTSDA")]
    pub ptsda: Option<String>,
    #[sea_orm(column_name = "PTSDAMGR")]
    pub ptsdam: Option<String>,
    #[sea_orm(column_name = "PTSAUTO")]
    pub ptsauto: Option<String>,
    #[sea_orm(column_name = "PTSAUTOMGR")]
    pub ptsautom: Option<String>,
    #[sea_orm(column_name = "PTSSEC")]
    pub ptssec: Option<String>,
    #[sea_orm(column_name = "PTSSECMGR")]
    pub ptssecm: Option<String>,
    #[sea_orm(column_name = "PTSSUS")]
    pub ptssus: Option<String>,
    #[sea_orm(column_name = "PTSSUSMGR")]
    pub ptssusm: Option<String>,
    #[sea_orm(column_name = "PTSZ")]
    pub ptsz: Option<String>,
    #[sea_orm(column_name = "PTSZMGR")]
    pub ptszm: Option<String>,
    #[sea_orm(column_name = "PTSPOW")]
    pub ptspow: Option<String>,
    #[sea_orm(column_name = "PTSPOWMGR")]
    pub ptspowm: Option<String>,
    #[sea_orm(column_name = "PTSSTOR")]
    pub ptsstor: Option<String>,
    #[sea_orm(column_name = "PTSSTORMGR")]
    pub ptsstorm: Option<String>,
    #[sea_orm(column_name = "PTSCLOUD")]
    pub ptscloud: Option<String>,
    #[sea_orm(column_name = "PTSCLOUDMGR")]
    pub ptscloudm: Option<String>,
    #[sea_orm(column_name = "ELADEAL")]
    pub eladeal: Option<String>,
    #[sea_orm(column_name = "ELADEALMGR")]
    pub eladealm: Option<String>,
    #[sea_orm(column_name = "ESADEAL")]
    pub esadeal: Option<String>,
    #[sea_orm(column_name = "ESADEALMGR")]
    pub esadealm: Option<String>,
    #[sea_orm(column_name = "ZSW")]
    pub zsw: Option<String>,
    #[sea_orm(column_name = "ZSWMGR")]
    pub zswm: Option<String>,
    #[sea_orm(column_name = "TURBOINST")]
    pub turboinst: Option<String>,
    #[sea_orm(column_name = "TURBOINSTMGR")]
    pub turboinstm: Option<String>,
    #[sea_orm(column_name = "IGF")]
    pub igf: Option<String>,
    #[sea_orm(column_name = "IGFMGR")]
    pub igfm: Option<String>,
    #[sea_orm(column_name = "EXPLABS")]
    pub explabs: Option<String>,
    #[sea_orm(column_name = "EXPLABSMGR")]
    pub explabsm: Option<String>,
    #[sea_orm(column_name = "CSMSW")]
    pub csmsw: Option<String>,
    #[sea_orm(column_name = "CSMSWMGR")]
    pub csmswm: Option<String>,
    #[sea_orm(column_name = "CSMCLOUD")]
    pub csmcloud: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Logical field name, physical column name and entity column of one attribute.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub column_name: &'static str,
    pub column: Column,
}

/// All string attributes in declaration order. `cid` is not part of it: it is
/// assigned by storage and never accepted from callers.
pub static FIELDS: [FieldDef; 57] = [
    FieldDef { name: "shortname", column_name: "PARTNAME", column: Column::Shortname },
    FieldDef { name: "gbg", column_name: "GBG", column: Column::Gbg },
    FieldDef { name: "crosstps", column_name: "CROSSTPS", column: Column::Crosstps },
    FieldDef { name: "crosstpsm", column_name: "CROSSTPSMGR", column: Column::Crosstpsm },
    FieldDef { name: "mgexec", column_name: "MGEXEC", column: Column::Mgexec },
    FieldDef { name: "mgexecm", column_name: "MGEXECMGR", column: Column::Mgexecm },
    FieldDef { name: "silablead", column_name: "SILABLEAD", column: Column::Silablead },
    FieldDef { name: "silableadm", column_name: "SILABLEADMGR", column: Column::Silableadm },
    FieldDef { name: "solarch", column_name: "SOLARCH", column: Column::Solarch },
    FieldDef { name: "solarchm", column_name: "SOLARCHMGR", column: Column::Solarchm },
    FieldDef { name: "bpsdaa", column_name: "BPSDAA", column: Column::Bpsdaa },
    FieldDef { name: "bpsdaam", column_name: "BPSDAAMGR", column: Column::Bpsdaam },
    FieldDef { name: "bpssec", column_name: "BPSSEC", column: Column::Bpssec },
    FieldDef { name: "bpssecm", column_name: "BPSSECMGR", column: Column::Bpssecm },
    FieldDef { name: "bpssus", column_name: "BPSSUS", column: Column::Bpssus },
    FieldDef { name: "bpssusm", column_name: "BPSSUSMGR", column: Column::Bpssusm },
    FieldDef { name: "bpsz", column_name: "BPSZ", column: Column::Bpsz },
    FieldDef { name: "bpszm", column_name: "BPSZMGR", column: Column::Bpszm },
    FieldDef { name: "bpspow", column_name: "BPSPOW", column: Column::Bpspow },
    FieldDef { name: "bpspowm", column_name: "BPSPOWMGR", column: Column::Bpspowm },
    FieldDef { name: "bpsstor", column_name: "BPSSTOR", column: Column::Bpsstor },
    FieldDef { name: "bpsstorm", column_name: "BPSSTORMGR", column: Column::Bpsstorm },
    FieldDef { name: "bpscloud", column_name: "BPSCLOUD", column: Column::Bpscloud },
    FieldDef { name: "bpscloudm", column_name: "BPSCLOUDMGR", column: Column::Bpscloudm },
    FieldDef { name: "crosspts", column_name: "CROSSPTS", column: Column::Crosspts },
    FieldDef { name: "crossptsm", column_name: "CROSSPTSMGR", column: Column::Crossptsm },
    FieldDef { name: "ptsda", column_name: "PTSDA", column: Column::Ptsda },
    FieldDef { name: "ptsdam", column_name: "PTSDAMGR", column: Column::Ptsdam },
    FieldDef { name: "ptsauto", column_name: "PTSAUTO", column: Column::Ptsauto },
    FieldDef { name: "ptsautom", column_name: "PTSAUTOMGR", column: Column::Ptsautom },
    FieldDef { name: "ptssec", column_name: "PTSSEC", column: Column::Ptssec },
    FieldDef { name: "ptssecm", column_name: "PTSSECMGR", column: Column::Ptssecm },
    FieldDef { name: "ptssus", column_name: "PTSSUS", column: Column::Ptssus },
    FieldDef { name: "ptssusm", column_name: "PTSSUSMGR", column: Column::Ptssusm },
    FieldDef { name: "ptsz", column_name: "PTSZ", column: Column::Ptsz },
    FieldDef { name: "ptszm", column_name: "PTSZMGR", column: Column::Ptszm },
    FieldDef { name: "ptspow", column_name: "PTSPOW", column: Column::Ptspow },
    FieldDef { name: "ptspowm", column_name: "PTSPOWMGR", column: Column::Ptspowm },
    FieldDef { name: "ptsstor", column_name: "PTSSTOR", column: Column::Ptsstor },
    FieldDef { name: "ptsstorm", column_name: "PTSSTORMGR", column: Column::Ptsstorm },
    FieldDef { name: "ptscloud", column_name: "PTSCLOUD", column: Column::Ptscloud },
    FieldDef { name: "ptscloudm", column_name: "PTSCLOUDMGR", column: Column::Ptscloudm },
    FieldDef { name: "eladeal", column_name: "ELADEAL", column: Column::Eladeal },
    FieldDef { name: "eladealm", column_name: "ELADEALMGR", column: Column::Eladealm },
    FieldDef { name: "esadeal", column_name: "ESADEAL", column: Column::Esadeal },
    FieldDef { name: "esadealm", column_name: "ESADEALMGR", column: Column::Esadealm },
    FieldDef { name: "zsw", column_name: "ZSW", column: Column::Zsw },
    FieldDef { name: "zswm", column_name: "ZSWMGR", column: Column::Zswm },
    FieldDef { name: "turboinst", column_name: "TURBOINST", column: Column::Turboinst },
    FieldDef { name: "turboinstm", column_name: "TURBOINSTMGR", column: Column::Turboinstm },
    FieldDef { name: "igf", column_name: "IGF", column: Column::Igf },
    FieldDef { name: "igfm", column_name: "IGFMGR", column: Column::Igfm },
    FieldDef { name: "explabs", column_name: "EXPLABS", column: Column::Explabs },
    FieldDef { name: "explabsm", column_name: "EXPLABSMGR", column: Column::Explabsm },
    FieldDef { name: "csmsw", column_name: "CSMSW", column: Column::Csmsw },
    FieldDef { name: "csmswm", column_name: "CSMSWMGR", column: Column::Csmswm },
    FieldDef { name: "csmcloud", column_name: "CSMCLOUD", column: Column::Csmcloud },
];

/// Look up an attribute by its public (JSON) name.
pub fn field(name: &str) -> Option<&'static FieldDef> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Values for the string attributes of a row, keyed by [`FieldDef`] so that
/// unknown names cannot get in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageFields {
    values: BTreeMap<&'static str, String>,
}

impl CoverageFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every attribute set to the same value, as used by the sample rows.
    pub fn uniform(value: &str) -> Self {
        let mut fields = Self::new();
        for def in FIELDS.iter() {
            fields.set(def, value);
        }
        fields
    }

    pub fn set(&mut self, def: &'static FieldDef, value: impl Into<String>) {
        self.values.insert(def.name, value.into());
    }

    /// Set by public name; unknown names are rejected.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Result<Self, ModelError> {
        let def = field(name).ok_or_else(|| ModelError::Validation(format!("unknown field `{name}`")))?;
        self.set(def, value);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names of attributes that have not been set, in declaration order.
    pub fn missing(&self) -> Vec<&'static str> {
        FIELDS
            .iter()
            .filter(|f| !self.values.contains_key(f.name))
            .map(|f| f.name)
            .collect()
    }

    fn into_active_model(self) -> Result<ActiveModel, ModelError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ModelError::Validation(format!("missing fields: {}", missing.join(", "))));
        }
        let mut am = ActiveModel::new();
        for def in FIELDS.iter() {
            let value = self.values.get(def.name).cloned().unwrap_or_default();
            if value.chars().count() > MAX_FIELD_LEN {
                return Err(ModelError::Validation(format!(
                    "{} longer than {MAX_FIELD_LEN} characters",
                    def.name
                )));
            }
            am.set(def.column, Value::from(value));
        }
        Ok(am)
    }
}

/// The rows written by [`recreate_schema`] callers after a wipe.
pub fn sample_rows() -> Vec<CoverageFields> {
    vec![CoverageFields::uniform("Sample"), CoverageFields::uniform("Demonstration")]
}

/// One page of rows plus the totals needed for pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Model>,
    pub total: u64,
    pub pages: u64,
}

fn contains_pattern(needle: &str) -> String {
    format!("%{needle}%")
}

/// First row (lowest `cid`) whose `column` contains `needle`, ignoring case.
/// Both sides are folded by the database's `LOWER`, so a value always matches
/// itself even where the backend folds ASCII only.
/// `%` and `_` in `needle` keep their LIKE wildcard meaning.
async fn find_first_containing(
    db: &DatabaseConnection,
    column: Column,
    needle: &str,
) -> Result<Option<Model>, ModelError> {
    let pattern = contains_pattern(needle);
    debug!(column = column.as_str(), %pattern, "coverage_contains_lookup");
    Ok(Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(column)))
                .binary(BinOper::Like, Func::lower(Expr::val(pattern))),
        )
        .order_by_asc(Column::Cid)
        .one(db)
        .await?)
}

pub async fn find_by_gbg_contains(db: &DatabaseConnection, needle: &str) -> Result<Option<Model>, ModelError> {
    find_first_containing(db, Column::Gbg, needle).await
}

/// Like [`find_by_gbg_contains`] on `shortname`, except that every `+` in the
/// needle becomes `_`, i.e. a single-character wildcard. Callers rely on this
/// to pass names with spaces through URL paths.
pub async fn find_by_shortname_contains(db: &DatabaseConnection, needle: &str) -> Result<Option<Model>, ModelError> {
    let needle = needle.replace('+', "_");
    find_first_containing(db, Column::Shortname, &needle).await
}

/// Fetch page `page` (1-based) of `per_page` rows ordered by `cid`.
/// Pages past the end come back empty.
pub async fn list_paged(db: &DatabaseConnection, page: u64, per_page: u64) -> Result<Page, ModelError> {
    if page == 0 {
        return Err(ModelError::Validation("page must be >= 1".into()));
    }
    if per_page == 0 || per_page > MAX_PER_PAGE {
        return Err(ModelError::Validation(format!("per_page must be in 1..={MAX_PER_PAGE}")));
    }
    let paginator = Entity::find().order_by_asc(Column::Cid).paginate(db, per_page);
    let total = paginator.num_items().await?;
    let pages = total.div_ceil(per_page);
    let items = if page > pages {
        Vec::new()
    } else {
        paginator.fetch_page(page - 1).await?
    };
    Ok(Page { items, total, pages })
}

#[instrument(skip_all)]
pub async fn insert(db: &DatabaseConnection, fields: CoverageFields) -> Result<Model, ModelError> {
    let am = fields.into_active_model()?;
    let model = am.insert(db).await?;
    info!(cid = model.cid, "coverage_inserted");
    Ok(model)
}

/// Delete by primary key. `Ok(false)` when no row had that key.
pub async fn delete_by_cid(db: &DatabaseConnection, cid: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(cid).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// `CREATE TABLE IF NOT EXISTS` from the entity definition.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), ModelError> {
    let backend = db.get_database_backend();
    let stmt = Schema::new(backend).create_table_from_entity(Entity).if_not_exists().to_owned();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Drop the table, create it again and insert `rows`. Returns the number of
/// rows inserted.
///
/// The three steps run as separate statements. A failure part-way leaves the
/// table dropped, empty or partially seeded.
#[instrument(skip_all, fields(rows = rows.len()))]
pub async fn recreate_schema(db: &DatabaseConnection, rows: Vec<CoverageFields>) -> Result<usize, ModelError> {
    let backend = db.get_database_backend();

    let drop_stmt = Table::drop().table(Alias::new(TABLE_NAME)).if_exists().to_owned();
    db.execute(backend.build(&drop_stmt)).await?;

    let create = Schema::new(backend).create_table_from_entity(Entity);
    db.execute(backend.build(&create)).await?;

    let count = rows.len();
    if count > 0 {
        let models = rows
            .into_iter()
            .map(CoverageFields::into_active_model)
            .collect::<Result<Vec<_>, _>>()?;
        Entity::insert_many(models).exec(db).await?;
    }
    info!(table = TABLE_NAME, inserted = count, "coverage_table_recreated");
    Ok(count)
}
