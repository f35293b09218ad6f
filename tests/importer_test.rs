// ==========================================
// 原材料种子数据导入集成测试
// ==========================================
// 测试范围:
// 1. CSV 文件导入到供应分区
// 2. 非法行记入 rejected，不中断整体导入
// 3. 同 ID 重复行加法合并
// 4. 文件不存在 / 扩展名不符
// ==========================================


#[cfg(test)]
mod importer_test {
    use battery_ledger::importer::{ImportError, MaterialSeedImporter};
    use battery_ledger::{MaterialOrigin, PartitionKind, VerificationMark};
    use std::io::Write;
    use std::path::Path;
    use tempfile::Builder;

    use crate::test_helpers::create_test_node;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().expect("无法创建临时文件");
        file.write_all(content.as_bytes()).expect("无法写入临时文件");
        file
    }

    #[test]
    fn test_import_file_正常导入() {
        let (_temp, node) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");
        let importer = MaterialSeedImporter::new(node.inventory.clone());
        let csv = write_csv(
            "materialID,supplierID,name,quantity,status,verified\n\
             LI-001,SUP-A,Lithium,100,NEW,VERIFIED\n\
             LI-001,SUP-A,Lithium,20,NEW,\n\
             RC-001,RECYCLER,Cobalt,15,recycled,false\n\
             ,SUP-B,Nickel,40,,\n",
        );

        let summary = importer.import_file(csv.path()).unwrap();

        assert_eq!(summary.total_rows, 4);
        assert_eq!(summary.imported, 4);
        assert_eq!(summary.verified, 1);
        assert!(summary.rejected.is_empty());

        let lithium = node.inventory.query("LI-001").unwrap();
        assert_eq!(lithium.quantity, 120);
        assert_eq!(lithium.verified, VerificationMark::Verified);
        assert_eq!(node.inventory.query("RC-001").unwrap().origin, MaterialOrigin::Recycled);

        let nickel: Vec<_> = node
            .inventory
            .query_all()
            .unwrap()
            .into_iter()
            .filter(|r| r.name == "Nickel")
            .collect();
        assert_eq!(nickel.len(), 1);
        assert!(nickel[0].material_id.starts_with("MATERIAL-"));
    }

    #[test]
    fn test_import_file_非法行记入rejected() {
        let (_temp, node) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");
        let importer = MaterialSeedImporter::new(node.inventory.clone());
        let csv = write_csv(
            "materialID,supplierID,name,quantity,status\n\
             M1,SUP-A,Lithium,abc,NEW\n\
             M2,SUP-A,Cobalt,0,NEW\n\
             M3,SUP-A,Nickel,5,SALVAGED\n\
             M4,SUP-A,Manganese,5,NEW\n",
        );

        let summary = importer.import_file(csv.path()).unwrap();

        assert_eq!(summary.imported, 1);
        let rows: Vec<usize> = summary.rejected.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 3, 4]);
        assert!(summary.rejected[0].reason.contains("quantity"));
        assert_eq!(node.inventory.query_all().unwrap().len(), 1);
    }

    #[test]
    fn test_import_file_文件不存在() {
        let (_temp, node) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");
        let importer = MaterialSeedImporter::new(node.inventory.clone());

        let err = importer
            .import_file(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_import_file_扩展名不符() {
        let (_temp, node) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");
        let importer = MaterialSeedImporter::new(node.inventory.clone());
        let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(file, "materialID,supplierID,name,quantity").unwrap();

        let err = importer.import_file(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(ref ext) if ext == "xlsx"));
    }
}
