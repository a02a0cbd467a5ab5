use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[cfg(unix)]
use release_asset_packager::scanner::walker::ArtifactWalker;

#[test]
#[cfg(unix)]
fn repro_symlink_loop_terminates() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("dist");
    fs::create_dir(&root).unwrap();

    // dist/loop -> dist
    std::os::unix::fs::symlink(&root, root.join("loop")).unwrap();

    let deep = root.join("linux/x86_64/release");
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("app.tar.gz"), b"tarball").unwrap();
    std::os::unix::fs::symlink(deep.join("app.tar.gz"), root.join("latest.tar.gz")).unwrap();

    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let names: Vec<String> = ArtifactWalker::new(&root)
            .walk()
            .unwrap()
            .into_iter()
            .map(|entry| entry.relative)
            .collect();
        tx.send(names).unwrap();
    });

    match rx.recv_timeout(Duration::from_secs(5)) {
        Ok(names) => assert_eq!(
            names,
            vec!["latest.tar.gz", "linux/x86_64/release/app.tar.gz"]
        ),
        Err(_) => panic!("walk timed out - likely stuck in symlink loop"),
    }
}
