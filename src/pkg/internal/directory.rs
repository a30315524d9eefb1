use serde::Serialize;

use crate::{
    pkg::{
        internal::adaptors::hospitals::spec::{HospitalFilter, HospitalType},
        server::state::AppState,
    },
    prelude::Result,
};

#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub county: &'static str,
    pub townships: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct Specialty {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalListing {
    pub hospital_id: String,
    pub name: String,
    pub county: String,
    pub township: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub hospital_type: Option<HospitalType>,
}

pub const REGIONS: &[Region] = &[
    Region {
        county: "屏東縣",
        townships: &[
            "屏東市", "潮州鎮", "東港鎮", "恆春鎮", "萬丹鄉", "長治鄉", "麟洛鄉", "九如鄉",
            "里港鄉", "鹽埔鄉", "高樹鄉", "萬巒鄉", "內埔鄉", "竹田鄉", "新埤鄉", "枋寮鄉",
            "新園鄉", "崁頂鄉", "林邊鄉", "南州鄉", "佳冬鄉", "琉球鄉", "車城鄉", "滿州鄉",
            "枋山鄉", "三地門鄉", "霧台鄉", "瑪家鄉", "泰武鄉", "來義鄉", "春日鄉", "獅子鄉",
            "牡丹鄉",
        ],
    },
    Region {
        county: "台東縣",
        townships: &[
            "台東市", "成功鎮", "關山鎮", "卑南鄉", "鹿野鄉", "池上鄉", "東河鄉", "長濱鄉",
            "太麻里鄉", "大武鄉", "綠島鄉", "蘭嶼鄉", "延平鄉", "海端鄉", "達仁鄉", "金峰鄉",
        ],
    },
    Region {
        county: "花蓮縣",
        townships: &[
            "花蓮市", "鳳林鎮", "玉里鎮", "新城鄉", "吉安鄉", "壽豐鄉", "光復鄉", "豐濱鄉",
            "瑞穗鄉", "富里鄉", "秀林鄉", "萬榮鄉", "卓溪鄉",
        ],
    },
    Region {
        county: "澎湖縣",
        townships: &["馬公市", "湖西鄉", "白沙鄉", "西嶼鄉", "望安鄉", "七美鄉"],
    },
    Region {
        county: "金門縣",
        townships: &["金城鎮", "金湖鎮", "金沙鎮", "金寧鄉", "烈嶼鄉", "烏坵鄉"],
    },
    Region {
        county: "連江縣",
        townships: &["南竿鄉", "北竿鄉", "莒光鄉", "東引鄉"],
    },
];

const fn doctor(id: &'static str, name: &'static str) -> Specialty {
    Specialty {
        id,
        name,
        category: "醫師",
    }
}

const fn nursing(id: &'static str, name: &'static str) -> Specialty {
    Specialty {
        id,
        name,
        category: "護理",
    }
}

pub const DOCTOR_SPECIALTIES: &[Specialty] = &[
    doctor("internal_medicine", "內科"),
    doctor("surgery", "外科"),
    doctor("pediatrics", "小兒科"),
    doctor("obstetrics_gynecology", "婦產科"),
    doctor("family_medicine", "家醫科"),
    doctor("emergency", "急診醫學科"),
    doctor("orthopedics", "骨科"),
    doctor("dermatology", "皮膚科"),
    doctor("ophthalmology", "眼科"),
    doctor("ent", "耳鼻喉科"),
    doctor("psychiatry", "精神科"),
    doctor("neurology", "神經內科"),
    doctor("cardiology", "心臟內科"),
    doctor("gastroenterology", "腸胃內科"),
    doctor("rehabilitation", "復健科"),
    doctor("radiology", "放射科"),
    doctor("anesthesiology", "麻醉科"),
];

pub const NURSING_SPECIALTIES: &[Specialty] = &[
    nursing("medical_nursing", "內科護理"),
    nursing("surgical_nursing", "外科護理"),
    nursing("pediatric_nursing", "兒科護理"),
    nursing("obstetric_nursing", "產科護理"),
    nursing("emergency_nursing", "急診護理"),
    nursing("icu_nursing", "加護病房護理"),
];

pub fn regions() -> &'static [Region] {
    REGIONS
}

/// Unknown or missing professional types get the full catalogue.
pub fn specialties(professional_type: Option<&str>) -> Vec<Specialty> {
    match professional_type {
        Some("doctor") => DOCTOR_SPECIALTIES.to_vec(),
        Some("nurse" | "registered_nurse") => NURSING_SPECIALTIES.to_vec(),
        _ => DOCTOR_SPECIALTIES
            .iter()
            .chain(NURSING_SPECIALTIES)
            .cloned()
            .collect(),
    }
}

/// Active hospitals, ordered by name. Listings are keyed by hospital code.
pub async fn hospitals(state: &AppState, filter: &HospitalFilter) -> Result<Vec<HospitalListing>> {
    let hospitals = state.store.list_hospitals(filter).await?;
    Ok(hospitals
        .into_iter()
        .map(|h| HospitalListing {
            hospital_id: h.code,
            name: h.name,
            county: h.county,
            township: h.township,
            address: h.address,
            phone: h.phone,
            hospital_type: h.hospital_type,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::testing::memory_state;

    #[test]
    fn six_rural_counties() {
        let counties: Vec<&str> = regions().iter().map(|r| r.county).collect();
        assert_eq!(
            counties,
            vec!["屏東縣", "台東縣", "花蓮縣", "澎湖縣", "金門縣", "連江縣"]
        );
        assert!(regions().iter().all(|r| !r.townships.is_empty()));
    }

    #[test]
    fn specialties_follow_professional_type() {
        assert_eq!(specialties(Some("doctor")).len(), 17);
        assert_eq!(specialties(Some("registered_nurse")).len(), 6);
        assert_eq!(specialties(Some("pharmacist")).len(), 23);
        assert_eq!(specialties(None).len(), 23);
    }

    #[traced_test]
    #[tokio::test]
    async fn test_hospital_search() -> Result<()> {
        let (state, _) = memory_state().await;
        let filter = HospitalFilter {
            search: Some("醫院".into()),
            county: Some("屏東縣".into()),
            ..Default::default()
        };
        let listed = hospitals(&state, &filter).await?;
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|h| h.county == "屏東縣"));
        Ok(())
    }
}
