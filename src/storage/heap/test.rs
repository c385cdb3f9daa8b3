use super::Heap;
use crate::error::Result;
use crate::storage::Rid;

pub trait TestSuite<H: Heap> {
    fn setup() -> Result<H>;

    fn test() -> Result<()> {
        Self::test_insert_get()?;
        Self::test_update()?;
        Self::test_delete()?;
        Self::test_scan()?;
        Ok(())
    }

    fn test_insert_get() -> Result<()> {
        let mut h = Self::setup()?;
        assert!(h.is_empty());
        assert_eq!(None, h.get(Rid(0))?);

        let a = h.insert(vec![0x01])?;
        let b = h.insert(vec![0x02, 0x03])?;
        assert_ne!(a, b);
        assert_eq!(2, h.len());
        assert_eq!(Some(vec![0x01]), h.get(a)?);
        assert_eq!(Some(vec![0x02, 0x03]), h.get(b)?);
        assert_eq!(None, h.get(Rid(99))?);
        Ok(())
    }

    fn test_update() -> Result<()> {
        let mut h = Self::setup()?;
        let a = h.insert(vec![0x01])?;
        h.update(a, vec![0x0a])?;
        assert_eq!(Some(vec![0x0a]), h.get(a)?);
        assert_eq!(1, h.len());
        assert!(h.update(Rid(99), vec![0x0b]).is_err());
        Ok(())
    }

    fn test_delete() -> Result<()> {
        let mut h = Self::setup()?;
        let a = h.insert(vec![0x01])?;
        let b = h.insert(vec![0x02])?;
        h.delete(a)?;
        assert_eq!(None, h.get(a)?);
        assert_eq!(Some(vec![0x02]), h.get(b)?);
        assert_eq!(1, h.len());
        assert!(h.delete(a).is_err());

        // Deleted RIDs are not handed out again.
        let c = h.insert(vec![0x03])?;
        assert_ne!(a, c);
        Ok(())
    }

    fn test_scan() -> Result<()> {
        let mut h = Self::setup()?;
        assert_eq!(0, h.scan().count());

        let a = h.insert(vec![0x01])?;
        let b = h.insert(vec![0x02])?;
        let c = h.insert(vec![0x03])?;
        h.delete(b)?;
        h.update(c, vec![0x0c])?;

        assert_eq!(
            vec![(a, vec![0x01]), (c, vec![0x0c])],
            h.scan().collect::<Result<Vec<_>>>()?
        );
        Ok(())
    }
}
