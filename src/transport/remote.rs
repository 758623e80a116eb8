use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::hashing::{HASH_HEX_LEN, Hash};
use crate::{Constants, Error, Result};

use super::pkt_line::{self, PktLine};

const USER_AGENT: &str = "git/gitc";
const UPLOAD_PACK_REQUEST: &str = "application/x-git-upload-pack-request";
const UPLOAD_PACK_RESULT: &str = "application/x-git-upload-pack-result";
const WANT_CAPABILITIES: &str = "no-progress ofs-delta";
const HEAD_REF: &str = "HEAD";

/// Client for a remote repository served over the smart HTTP protocol.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    client: Client,
}

impl RemoteClient {
    /// Creates a client for the repository at `url`, where every request is bounded by
    /// `timeout`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: &str, client: Client) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_owned(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Asks the remote for its refs and returns the commit `refs/heads/<branch>` points to,
    /// falling back to the one advertised as HEAD.
    ///
    /// # Errors
    ///
    /// This function will fail with `Error::NoDefaultRef` (which carries the whole response) if
    /// neither ref is advertised.
    pub fn discover_head(&self, branch: &str) -> Result<Hash> {
        let url = format!(
            "{}/info/refs?service={}",
            self.base_url,
            Constants::UPLOAD_PACK_SERVICE
        );
        log::info!("discovering refs at {}", url);

        let response = self.client.get(&url).send()?.error_for_status()?.bytes()?;

        match find_ref(&response, branch)? {
            Some(hash) => {
                log::info!("remote {} is at {}", branch, hash);
                Ok(hash)
            }
            None => Err(Error::NoDefaultRef {
                url,
                branch: branch.to_owned(),
                response: String::from_utf8_lossy(&response).into_owned(),
            }),
        }
    }

    /// Asks the remote for a pack containing `want` and everything reachable from it, returning
    /// the pack bytes (starting at its signature).
    ///
    /// # Errors
    ///
    /// This function will fail with `Error::MalformedPackResponse` if the response does not
    /// contain a pack.
    pub fn request_pack(&self, want: &Hash) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.base_url, Constants::UPLOAD_PACK_SERVICE);
        log::info!("requesting pack for {} from {}", want, url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, UPLOAD_PACK_REQUEST)
            .header(ACCEPT, UPLOAD_PACK_RESULT)
            .body(want_request(want)?)
            .send()?
            .error_for_status()?
            .bytes()?;

        let pack = locate_pack(&response)?;
        log::info!("received pack of {} bytes", pack.len());
        Ok(pack.to_vec())
    }
}

/// Builds the body of an upload-pack request asking for a single object.
pub fn want_request(want: &Hash) -> Result<Vec<u8>> {
    let mut body = pkt_line::encode(format!("want {} {}\n", want, WANT_CAPABILITIES).as_bytes())?;
    body.extend(pkt_line::flush());
    body.extend(pkt_line::encode(b"done\n")?);
    Ok(body)
}

/// Returns the slice of `response` starting at the pack signature.
pub fn locate_pack(response: &[u8]) -> Result<&[u8]> {
    response
        .windows(Constants::PACK_SIGNATURE.len())
        .position(|w| w == Constants::PACK_SIGNATURE)
        .map(|start| &response[start..])
        .ok_or_else(|| {
            Error::MalformedPackResponse(format!(
                "no pack signature in a response of {} bytes: {:?}",
                response.len(),
                String::from_utf8_lossy(&response[..response.len().min(64)])
            ))
        })
}

/// Parses a ref line, `<40 hex> <name>[\0<capabilities>]`.
fn parse_ref_line(line: &[u8]) -> Option<(Hash, String)> {
    let line = line.split(|&b| b == b'\0').next()?;
    // the hex is checked on raw bytes, the rest of the line may be anything
    let hex = std::str::from_utf8(line.get(..HASH_HEX_LEN)?).ok()?;
    let hash = Hash::from_str(hex).ok()?;
    let name = String::from_utf8_lossy(&line[HASH_HEX_LEN..]);
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((hash, name.to_owned()))
}

/// Looks for `refs/heads/<branch>`, and then for HEAD, in a ref advertisement.
///
/// The advertisement is expected in pkt-line framing, but a plain newline separated listing is
/// accepted too.
pub fn find_ref(response: &[u8], branch: &str) -> Result<Option<Hash>> {
    let lines: Vec<Vec<u8>> = match pkt_line::decode(response) {
        Ok(pkts) => pkts
            .iter()
            .filter_map(PktLine::text)
            .map(<[u8]>::to_vec)
            .collect(),
        Err(e) => {
            log::debug!("ref advertisement is not pkt-line framed ({}), scanning lines", e);
            response
                .split(|&b| b == b'\n')
                .map(<[u8]>::to_vec)
                .collect()
        }
    };

    let refs: Vec<(Hash, String)> = lines.iter().filter_map(|l| parse_ref_line(l)).collect();
    log::debug!("remote advertised {} refs", refs.len());

    let branch_ref = format!(
        "{}/{}/{}",
        Constants::REFS_FOLDER_NAME,
        Constants::HEADS_FOLDER_NAME,
        branch
    );
    let found = refs
        .iter()
        .find(|(_, name)| *name == branch_ref)
        .or_else(|| refs.iter().find(|(_, name)| name == HEAD_REF))
        .map(|(hash, _)| *hash);

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock_server::MockServer;

    const MAIN_HASH: &str = "7fd1a60b01f91b314f59955a4e4d4e80d8edf11d";
    const HEAD_HASH: &str = "2bbc3c1d6a8e8f2a4c1c2b4d3e2f1a0b9c8d7e6f";

    fn advertisement(refs: &[(&str, &str)]) -> Vec<u8> {
        let mut body = pkt_line::encode(b"# service=git-upload-pack\n").unwrap();
        body.extend(pkt_line::flush());
        for (i, (hash, name)) in refs.iter().enumerate() {
            let line = if i == 0 {
                format!("{} {}\0multi_ack ofs-delta side-band-64k\n", hash, name)
            } else {
                format!("{} {}\n", hash, name)
            };
            body.extend(pkt_line::encode(line.as_bytes()).unwrap());
        }
        body.extend(pkt_line::flush());
        body
    }

    fn test_client(url: &str) -> RemoteClient {
        let client = Client::builder().no_proxy().build().unwrap();
        RemoteClient::with_client(url, client)
    }

    #[test]
    fn test_find_ref_prefers_branch() {
        let response = advertisement(&[
            (HEAD_HASH, "HEAD"),
            (HEAD_HASH, "refs/heads/feature"),
            (MAIN_HASH, "refs/heads/main"),
        ]);
        assert_eq!(
            Some(Hash::from_str(MAIN_HASH).unwrap()),
            find_ref(&response, "main").unwrap()
        );
    }

    #[test]
    fn test_find_ref_falls_back_to_head() {
        let response = advertisement(&[(HEAD_HASH, "HEAD"), (MAIN_HASH, "refs/heads/master")]);
        assert_eq!(
            Some(Hash::from_str(HEAD_HASH).unwrap()),
            find_ref(&response, "main").unwrap()
        );
    }

    #[test]
    fn test_find_ref_plain_listing() {
        let response = format!("{}\trefs/heads/main\n", MAIN_HASH);
        assert_eq!(
            Some(Hash::from_str(MAIN_HASH).unwrap()),
            find_ref(response.as_bytes(), "main").unwrap()
        );
    }

    #[test]
    fn test_find_ref_missing() {
        let response = advertisement(&[(MAIN_HASH, "refs/heads/develop")]);
        assert_eq!(None, find_ref(&response, "main").unwrap());
    }

    #[test]
    fn test_find_ref_in_non_ascii_listing() {
        let response = format!("{}é and some trailing text\n", "a".repeat(39));
        assert_eq!(None, find_ref(response.as_bytes(), "main").unwrap());

        let response = "<html><body>Dépôt introuvable, réessayez plus tard</body></html>\n";
        assert_eq!(None, find_ref(response.as_bytes(), "main").unwrap());
    }

    #[test]
    fn test_discover_head_on_html_page() {
        let page = format!("<html><p>{}é</p></html>\n", "0".repeat(39));
        let server = MockServer::start(vec![page.clone().into_bytes()]);

        match test_client(&server.url()).discover_head("main") {
            Err(Error::NoDefaultRef { response, .. }) => assert_eq!(page, response),
            other => panic!("expected NoDefaultRef, got {:?}", other),
        }
    }

    #[test]
    fn test_want_request() {
        let want = Hash::from_str(MAIN_HASH).unwrap();
        let body = want_request(&want).unwrap();
        let expected = format!(
            "0048want {} no-progress ofs-delta\n00000009done\n",
            MAIN_HASH
        );
        assert_eq!(expected.as_bytes(), body.as_slice());
    }

    #[test]
    fn test_locate_pack() {
        let response = b"0008NAK\nPACK\0\0\0\x02\0\0\0\0";
        assert_eq!(b"PACK\0\0\0\x02\0\0\0\0", locate_pack(response).unwrap());
        assert!(matches!(
            locate_pack(b"0008NAK\n"),
            Err(Error::MalformedPackResponse(_))
        ));
    }

    #[test]
    fn test_discover_head_over_http() {
        let server = MockServer::start(vec![advertisement(&[
            (HEAD_HASH, "HEAD"),
            (MAIN_HASH, "refs/heads/main"),
        ])]);

        let client = test_client(&format!("{}/", server.url()));
        let hash = client.discover_head("main").unwrap();

        assert_eq!(Hash::from_str(MAIN_HASH).unwrap(), hash);
        let requests = server.requests();
        assert_eq!("GET", requests[0].method);
        assert_eq!("/info/refs?service=git-upload-pack", requests[0].path);
    }

    #[test]
    fn test_discover_head_without_ref_dumps_response() {
        let server = MockServer::start(vec![advertisement(&[(MAIN_HASH, "refs/heads/dev")])]);

        let client = test_client(&server.url());
        match client.discover_head("main") {
            Err(Error::NoDefaultRef { response, .. }) => {
                assert!(response.contains("refs/heads/dev"))
            }
            other => panic!("expected NoDefaultRef, got {:?}", other),
        }
    }

    #[test]
    fn test_request_pack_over_http() {
        let mut body = b"0008NAK\n".to_vec();
        body.extend(b"PACK\0\0\0\x02\0\0\0\0");
        let server = MockServer::start(vec![body]);

        let client = test_client(&server.url());
        let want = Hash::from_str(MAIN_HASH).unwrap();
        let pack = client.request_pack(&want).unwrap();

        assert!(pack.starts_with(b"PACK"));
        let requests = server.requests();
        assert_eq!("POST", requests[0].method);
        assert_eq!("/git-upload-pack", requests[0].path);
        assert_eq!(want_request(&want).unwrap(), requests[0].body);
        assert_eq!(
            Some(UPLOAD_PACK_REQUEST.to_owned()),
            requests[0].header("content-type")
        );
    }

    #[test]
    fn test_request_pack_without_pack() {
        let server = MockServer::start(vec![b"0008NAK\n".to_vec()]);
        let client = test_client(&server.url());
        let want = Hash::from_str(MAIN_HASH).unwrap();

        assert!(matches!(
            client.request_pack(&want),
            Err(Error::MalformedPackResponse(_))
        ));
    }
}
