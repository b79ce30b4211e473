//! Identities for common scalar and string types so open polymorphic slots can hold them.

crate::stable_identity!(String = "situk-lamob-rinaf-zodup");
crate::stable_identity!(bool = "bokul-hasiv-tonum-pidaz");
crate::stable_identity!(i64 = "nimag-ruzod-fikol-bajuv");
crate::stable_identity!(u64 = "lufom-pakis-dogur-hitan");
crate::stable_identity!(f64 = "folut-vimad-kasop-runig");
