use crate::domain::model::{Branch, Pillar, Stem};
use crate::utils::error::Result;

/// Hour pillar for a clock hour given the day's stem ("five rats" rule).
///
/// Two-hour slots start at 23:00, so hour 23 and hour 0 both map to 子.
/// The stem of the 子 slot cycles with the day stem: 甲/己 days start at 甲子,
/// 乙/庚 at 丙子, 丙/辛 at 戊子, 丁/壬 at 庚子, 戊/癸 at 壬子.
pub fn hour_pillar(hour: u32, day_stem: Stem) -> Result<Pillar> {
    let branch_index = ((hour as usize + 1) / 2) % 12;
    let stem_index = ((day_stem.index() % 5) * 2 + branch_index) % 10;
    Pillar::new(Stem::from_index(stem_index)?, Branch::from_index(branch_index)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(symbol: &str) -> Stem {
        symbol.parse().unwrap()
    }

    #[test]
    fn test_slot_boundaries() {
        let jia = stem("甲");
        assert_eq!(hour_pillar(0, jia).unwrap().to_string(), "甲子");
        assert_eq!(hour_pillar(1, jia).unwrap().to_string(), "乙丑");
        assert_eq!(hour_pillar(2, jia).unwrap().to_string(), "乙丑");
        assert_eq!(hour_pillar(11, jia).unwrap().to_string(), "庚午");
        assert_eq!(hour_pillar(22, jia).unwrap().to_string(), "乙亥");
        assert_eq!(hour_pillar(23, jia).unwrap().to_string(), "甲子");
    }

    #[test]
    fn test_rat_hour_stem_per_day_stem() {
        let expected = [
            ("甲", "甲子"),
            ("乙", "丙子"),
            ("丙", "戊子"),
            ("丁", "庚子"),
            ("戊", "壬子"),
            ("己", "甲子"),
            ("庚", "丙子"),
            ("辛", "戊子"),
            ("壬", "庚子"),
            ("癸", "壬子"),
        ];
        for (day, rat) in expected {
            assert_eq!(hour_pillar(0, stem(day)).unwrap().to_string(), rat, "day stem {}", day);
        }
    }

    #[test]
    fn test_every_hour_yields_valid_pillar() {
        for index in 0..10 {
            let day_stem = Stem::from_index(index).unwrap();
            for hour in 0..24 {
                let pillar = hour_pillar(hour, day_stem).unwrap();
                assert_eq!(pillar.stem().index() % 2, pillar.branch().index() % 2);
            }
        }
    }
}
