//! GraphQL documents sent to Linear.

pub const USER_FIELDS: &str = "id name displayName email";

pub const VIEWER: &str = r#"
query Viewer {
  viewer { id name displayName email }
}
"#;

pub const ORGANIZATION: &str = r#"
query Organization {
  organization { id name urlKey }
}
"#;

pub const ISSUE_AGENT_SESSION: &str = r#"
query IssueAgentSession($id: String!) {
  issue(id: $id) {
    id
    identifier
    title
    delegate { id name displayName email }
    comments(first: 50) {
      nodes {
        id
        body
        createdAt
        updatedAt
        user { id name displayName email }
        agentSession {
          id
          status
          createdAt
          updatedAt
          appUser { id name displayName email }
          activities(first: 50) {
            nodes {
              id
              createdAt
              ephemeral
              content {
                ... on AgentActivityThoughtContent { type body }
                ... on AgentActivityResponseContent { type body }
                ... on AgentActivityElicitationContent { type body }
                ... on AgentActivityErrorContent { type body }
                ... on AgentActivityPromptContent { type body }
                ... on AgentActivityActionContent { type action parameter result }
              }
            }
            pageInfo { hasNextPage endCursor }
          }
        }
      }
    }
  }
}
"#;

pub const CREATE_COMMENT: &str = r#"
mutation CreateComment($input: CommentCreateInput!) {
  commentCreate(input: $input) {
    success
    comment {
      id
      body
      createdAt
      updatedAt
      user { id name displayName email }
      parent { id }
    }
  }
}
"#;

pub const ISSUE_COMMENTS: &str = r#"
query IssueComments($id: String!, $first: Int!, $orderBy: PaginationOrderBy) {
  issue(id: $id) {
    comments(first: $first, orderBy: $orderBy) {
      nodes {
        id
        body
        createdAt
        updatedAt
        user { id name displayName email }
        parent { id }
        resolvedAt
        resolvingUser { id name displayName email }
      }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;

pub const DELETE_COMMENT: &str = r#"
mutation DeleteComment($id: String!) {
  commentDelete(id: $id) { success }
}
"#;

pub const RESOLVE_COMMENT: &str = r#"
mutation ResolveComment($id: String!) {
  commentResolve(id: $id) {
    success
    comment {
      id
      body
      resolvedAt
      resolvingUser { id name displayName email }
    }
  }
}
"#;

pub const UNRESOLVE_COMMENT: &str = r#"
mutation UnresolveComment($id: String!) {
  commentUnresolve(id: $id) {
    success
    comment { id body resolvedAt }
  }
}
"#;

pub const LIST_ISSUES: &str = r#"
query ListIssues($first: Int!, $filter: IssueFilter) {
  issues(first: $first, filter: $filter, orderBy: updatedAt) {
    nodes {
      id
      identifier
      title
      priority
      url
      state { id name type }
      assignee { id name displayName email }
      delegate { id name displayName email }
      team { id key name }
      createdAt
      updatedAt
    }
    pageInfo { hasNextPage endCursor }
  }
}
"#;

pub const GET_ISSUE: &str = r#"
query GetIssue($id: String!) {
  issue(id: $id) {
    id
    identifier
    title
    description
    priority
    url
    state { id name type }
    assignee { id name displayName email }
    delegate { id name displayName email }
    team { id key name }
    project { id name }
    labels { nodes { id name color } }
    createdAt
    updatedAt
  }
}
"#;

pub const CREATE_ISSUE: &str = r#"
mutation CreateIssue($input: IssueCreateInput!) {
  issueCreate(input: $input) {
    success
    issue {
      id
      identifier
      title
      url
      priority
      state { id name type }
      assignee { id name displayName email }
      delegate { id name displayName email }
      team { id key name }
      project { id name }
    }
  }
}
"#;

pub const UPDATE_ISSUE: &str = r#"
mutation UpdateIssue($id: String!, $input: IssueUpdateInput!) {
  issueUpdate(id: $id, input: $input) {
    success
    issue {
      id
      identifier
      title
      url
      priority
      state { id name type }
      assignee { id name displayName email }
      delegate { id name displayName email }
      team { id key name }
      project { id name }
    }
  }
}
"#;

pub const TEAM_BY_KEY: &str = r#"
query TeamByKey($key: String!) {
  teams(filter: { key: { eq: $key } }) {
    nodes { id key name }
  }
}
"#;

pub const WORKFLOW_STATE: &str = r#"
query WorkflowState($teamId: ID!, $name: String!) {
  workflowStates(filter: { team: { id: { eq: $teamId } }, name: { eqIgnoreCase: $name } }) {
    nodes { id name type }
  }
}
"#;

pub const FIND_USER: &str = r#"
query FindUser($query: String!) {
  users(
    includeDisabled: false
    filter: {
      or: [
        { email: { eq: $query } }
        { name: { eqIgnoreCase: $query } }
        { displayName: { eqIgnoreCase: $query } }
      ]
    }
  ) {
    nodes { id name displayName email }
  }
}
"#;

pub const TEAM_LABELS: &str = r#"
query TeamLabels($teamId: ID!) {
  issueLabels(first: 250, filter: { or: [{ team: { id: { eq: $teamId } } }, { team: { null: true } }] }) {
    nodes { id name color }
  }
}
"#;
