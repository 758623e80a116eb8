pub struct Constants;

impl Constants {
    pub const REPOSITORY_FOLDER_NAME: &str = ".git";
    pub const OBJECTS_FOLDER_NAME: &str = "objects";
    pub const REFS_FOLDER_NAME: &str = "refs";
    pub const HEADS_FOLDER_NAME: &str = "heads";
    pub const HEAD_CONTENT_HEADER: &str = "ref: ";
    pub const DEFAULT_BRANCH_NAME: &str = "main";
    pub const HEAD_FILE_NAME: &str = "HEAD";
    pub const UPLOAD_PACK_SERVICE: &str = "git-upload-pack";
    pub const PACK_SIGNATURE: &[u8; 4] = b"PACK";

    /// Content of the HEAD file for a repository whose default branch is `branch`.
    pub fn head_content(branch: &str) -> String {
        format!(
            "{}{}/{}/{}\n",
            Constants::HEAD_CONTENT_HEADER,
            Constants::REFS_FOLDER_NAME,
            Constants::HEADS_FOLDER_NAME,
            branch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_content() {
        assert_eq!("ref: refs/heads/main\n", Constants::head_content("main"));
    }
}
