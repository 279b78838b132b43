//! Female trait variants: the same trait tree pinned under a different IPFS
//! bucket, with a few base parts renamed.

use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::core::Season;

static IPFS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(https://neotokyo\.mypinata\.cloud/ipfs)/(Qm\w+)/(.+)").expect("static regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IpfsBuckets {
    pub male: &'static str,
    pub female: &'static str,
}

const SEASON_ONE_BUCKETS: IpfsBuckets = IpfsBuckets {
    male: "QmPLW6u5MRut1b8iyVc47ET5zAj9VaG2GwyjcuKLoetWsT",
    female: "QmPVfdHHdjyZb6BKHhwaJ1eEdCx9Jz4mvCn4KHiCJQaB8e",
};

// Season two ships both variants in one bucket.
const SEASON_TWO_BUCKETS: IpfsBuckets = IpfsBuckets {
    male: "QmeqeBpsYTuJL8AZhY9fGBeTj9QuvMVqaZeRWFnjA24QEE",
    female: "QmeqeBpsYTuJL8AZhY9fGBeTj9QuvMVqaZeRWFnjA24QEE",
};

pub fn buckets(season: Season) -> Option<IpfsBuckets> {
    match season {
        Season::ONE => Some(SEASON_ONE_BUCKETS),
        Season::TWO => Some(SEASON_TWO_BUCKETS),
        _ => None,
    }
}

/// Point a trait href at the female bucket for `season`.
///
/// Base parts (`body`, `hand`, `head`) stored as `<part>/0.png` move to
/// `<part>/0-0.png`; the hand additionally lives under `fist/`. Hrefs outside
/// the IPFS gateway are returned unchanged.
pub fn female_variant(href: &str, season: Season) -> String {
    let Some(buckets) = buckets(season) else {
        return href.to_string();
    };
    let Some(caps) = IPFS_URL.captures(href) else {
        return href.to_string();
    };

    let gateway = &caps[1];
    let mut rest = caps[3].to_string();

    if let Some((part, file)) = rest.split_once('/') {
        let base = ["body", "hand", "head"]
            .into_iter()
            .find(|b| part.contains(b));
        if let Some(base) = base
            && file == "0.png"
        {
            rest = if base == "hand" {
                format!("{part}/fist/0-0.png")
            } else {
                format!("{part}/0-0.png")
            };
        }
    }

    format!("{gateway}/{}/{rest}", buckets.female)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GW: &str = "https://neotokyo.mypinata.cloud/ipfs";

    #[test]
    fn swaps_season_one_bucket() {
        let href = format!("{GW}/{}/helm/3.png", SEASON_ONE_BUCKETS.male);
        assert_eq!(
            female_variant(&href, Season::ONE),
            format!("{GW}/{}/helm/3.png", SEASON_ONE_BUCKETS.female)
        );
    }

    #[test]
    fn renames_base_parts() {
        let f = SEASON_ONE_BUCKETS.female;
        assert_eq!(
            female_variant(&format!("{GW}/QmX/body/0.png"), Season::ONE),
            format!("{GW}/{f}/body/0-0.png")
        );
        assert_eq!(
            female_variant(&format!("{GW}/QmX/hand/0.png"), Season::ONE),
            format!("{GW}/{f}/hand/fist/0-0.png")
        );
        assert_eq!(
            female_variant(&format!("{GW}/QmX/head/0.png"), Season::ONE),
            format!("{GW}/{f}/head/0-0.png")
        );
    }

    #[test]
    fn other_files_keep_their_name() {
        let f = SEASON_TWO_BUCKETS.female;
        assert_eq!(
            female_variant(&format!("{GW}/QmX/body/10.png"), Season::TWO),
            format!("{GW}/{f}/body/10.png")
        );
        assert_eq!(
            female_variant(&format!("{GW}/QmX/weapon/0.png"), Season::TWO),
            format!("{GW}/{f}/weapon/0.png")
        );
    }

    #[test]
    fn foreign_urls_pass_through() {
        let href = "https://example.com/ipfs/QmX/body/0.png";
        assert_eq!(female_variant(href, Season::ONE), href);
        assert_eq!(female_variant(href, Season(9)), href);
    }
}
