//! Closed value sets stored as upper-case strings.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    #[sea_orm(string_value = "USER")]
    User,
    #[sea_orm(string_value = "ORGANIZER")]
    Organizer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    #[sea_orm(string_value = "CONCERT")]
    Concert,
    #[sea_orm(string_value = "THEATRE")]
    Theatre,
    #[sea_orm(string_value = "TALKSHOW")]
    Talkshow,
    #[sea_orm(string_value = "ANIME")]
    Anime,
    #[sea_orm(string_value = "IDOL")]
    Idol,
    #[sea_orm(string_value = "WEBINAR")]
    Webinar,
    #[sea_orm(string_value = "SPORT")]
    Sport,
    #[sea_orm(string_value = "ESPORT")]
    Esport,
    #[sea_orm(string_value = "FASHION")]
    Fashion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventLocation {
    #[sea_orm(string_value = "ONLINE")]
    Online,
    #[sea_orm(string_value = "JAKARTA")]
    Jakarta,
    #[sea_orm(string_value = "BANDUNG")]
    Bandung,
    #[sea_orm(string_value = "BOGOR")]
    Bogor,
    #[sea_orm(string_value = "DEPOK")]
    Depok,
    #[sea_orm(string_value = "TANGERANG")]
    Tangerang,
    #[sea_orm(string_value = "BEKASI")]
    Bekasi,
    #[sea_orm(string_value = "SEMARANG")]
    Semarang,
    #[sea_orm(string_value = "YOGYAKARTA")]
    Yogyakarta,
    #[sea_orm(string_value = "SOLO")]
    Solo,
    #[sea_orm(string_value = "SURABAYA")]
    Surabaya,
    #[sea_orm(string_value = "MALANG")]
    Malang,
    #[sea_orm(string_value = "BALI")]
    Bali,
    #[sea_orm(string_value = "MEDAN")]
    Medan,
    #[sea_orm(string_value = "MAKASSAR")]
    Makassar,
    #[sea_orm(string_value = "MOJOKERTO")]
    Mojokerto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[default]
    #[sea_orm(string_value = "WAITING_PAYMENT")]
    WaitingPayment,
    #[sea_orm(string_value = "WAITING_FOR_CONFIRMATION")]
    WaitingForConfirmation,
    #[sea_orm(string_value = "DONE")]
    Done,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}
